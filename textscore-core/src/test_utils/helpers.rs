// File: textscore-core/src/test_utils/helpers.rs

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::db::Database;
use crate::Error;

/// `TEST_DATABASE_URL`, if the environment provides a disposable database.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok().filter(|u| !u.trim().is_empty())
}

/// Create a connection pool to the test DB.
pub async fn create_test_db_pool(url: &str) -> Result<Pool<Postgres>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("TRUNCATE TABLE text_analyses RESTART IDENTITY")
        .execute(pool)
        .await?;

    Ok(())
}

/// A migrated, empty database, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn setup_test_database() -> Result<Option<Database>, Error> {
    let Some(url) = test_database_url() else {
        println!("TEST_DATABASE_URL not set; skipping Postgres-backed test.");
        return Ok(None);
    };

    let pool = create_test_db_pool(&url).await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(Some(db))
}
