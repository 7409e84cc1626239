// tests/integration/repository_tests.rs

use tokio::sync::Mutex;

use textscore_common::models::{NewTextAnalysis, Page};
use textscore_core::repositories::{PostgresTextAnalysisRepository, TextAnalysisRepo};
use textscore_core::test_utils::helpers::setup_test_database;
use textscore_core::Error;

// All tests share one database.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

#[tokio::test]
async fn create_assigns_id_and_timestamp() -> Result<(), Error> {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_test_database().await? else { return Ok(()) };
    let repo = PostgresTextAnalysisRepository::new(db.pool().clone());

    let saved = repo
        .create_analysis(&NewTextAnalysis::new("You are wonderful", 0.01, 0.97))
        .await?;

    assert!(saved.id > 0);
    assert_eq!(saved.input_text, "You are wonderful");
    assert_eq!(saved.toxicity_score, 0.01);
    assert_eq!(saved.gibberish_score, 0.97);

    let listed = repo.list_analyses(Page::default()).await?;
    assert_eq!(listed, vec![saved]);
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_and_windowed() -> Result<(), Error> {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_test_database().await? else { return Ok(()) };
    let repo = PostgresTextAnalysisRepository::new(db.pool().clone());

    let mut ids = Vec::new();
    for i in 0..5 {
        let saved = repo
            .create_analysis(&NewTextAnalysis::new(format!("row {i}"), 0.1, 0.9))
            .await?;
        ids.push(saved.id);
    }

    let all = repo.list_analyses(Page::default()).await?;
    assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), ids);
    assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));

    let window = repo.list_analyses(Page::new(Some(1), Some(2))?).await?;
    assert_eq!(window.iter().map(|r| r.id).collect::<Vec<_>>(), ids[1..3].to_vec());

    let empty = repo.list_analyses(Page::new(None, Some(0))?).await?;
    assert!(empty.is_empty());

    let past_end = repo.list_analyses(Page::new(Some(10), None)?).await?;
    assert!(past_end.is_empty());
    Ok(())
}

#[tokio::test]
async fn text_at_column_width_round_trips() -> Result<(), Error> {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_test_database().await? else { return Ok(()) };
    let repo = PostgresTextAnalysisRepository::new(db.pool().clone());

    let text = "ü".repeat(1000);
    let saved = repo.create_analysis(&NewTextAnalysis::new(text.clone(), 0.5, 0.5)).await?;
    assert_eq!(saved.input_text, text);
    Ok(())
}

#[tokio::test]
async fn out_of_range_score_violates_constraint() -> Result<(), Error> {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_test_database().await? else { return Ok(()) };
    let repo = PostgresTextAnalysisRepository::new(db.pool().clone());

    let result = repo.create_analysis(&NewTextAnalysis::new("x", 1.5, 0.5)).await;
    assert!(matches!(result, Err(Error::Database(_))));
    assert!(repo.list_analyses(Page::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn migrate_is_idempotent_and_reset_discards_rows() -> Result<(), Error> {
    let _guard = DB_LOCK.lock().await;
    let Some(db) = setup_test_database().await? else { return Ok(()) };
    let repo = PostgresTextAnalysisRepository::new(db.pool().clone());

    repo.create_analysis(&NewTextAnalysis::new("keep me", 0.2, 0.8)).await?;
    db.migrate().await?;
    assert_eq!(repo.list_analyses(Page::default()).await?.len(), 1);

    db.reset_schema().await?;
    assert!(repo.list_analyses(Page::default()).await?.is_empty());

    let fresh = repo.create_analysis(&NewTextAnalysis::new("after reset", 0.2, 0.8)).await?;
    assert_eq!(fresh.id, 1);
    Ok(())
}
