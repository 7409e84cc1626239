// tests/unit/http_router_tests.rs

use axum::body::Body;
use axum::http::{Request, StatusCode};

use textscore_ai::StubScorer;
use textscore_common::models::Page;
use textscore_core::test_utils::MemoryTextAnalysisRepository;
use textscore_core::Error;

use crate::test_utils::{app, get, json_body, post_json, send, stored, MockRepo, MockScorer};

#[tokio::test]
async fn root_returns_welcome_message() {
    let resp = send(app(StubScorer::new(), MockRepo::new()), get("/")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["message"], "Welcome to Text Analysis API");
}

#[tokio::test]
async fn analyze_returns_the_stored_record() {
    let mut repo = MockRepo::new();
    repo.expect_create_analysis()
        .withf(|new| new.input_text == "You are wonderful")
        .times(1)
        .returning(|new| Ok(stored(42, new)));

    let resp = send(
        app(StubScorer::new(), repo),
        post_json("/analyze/", r#"{"input_text": "You are wonderful"}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["id"], 42);
    assert_eq!(body["input_text"], "You are wonderful");
    let tox = body["toxicity_score"].as_f64().unwrap();
    let clean = body["gibberish_score"].as_f64().unwrap();
    assert!(tox < 0.1, "toxicity {tox}");
    assert!(clean > 0.9, "clean {clean}");
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn analyze_without_trailing_slash_is_routed() {
    let resp = send(
        app(StubScorer::new(), MemoryTextAnalysisRepository::new()),
        post_json("/analyze", r#"{"input_text": "hello"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn analyze_passes_both_scores_to_the_insert() {
    let mut scorer = MockScorer::new();
    scorer.expect_score_toxicity().returning(|_| Ok(0.25));
    scorer.expect_score_gibberish().returning(|_| Ok(0.75));

    let mut repo = MockRepo::new();
    repo.expect_create_analysis()
        .withf(|new| new.toxicity_score == 0.25 && new.gibberish_score == 0.75)
        .times(1)
        .returning(|new| Ok(stored(1, new)));

    let resp = send(app(scorer, repo), post_json("/analyze/", r#"{"input_text": "x"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn inference_failure_is_a_500_and_nothing_is_stored() {
    let mut scorer = MockScorer::new();
    scorer
        .expect_score_toxicity()
        .returning(|_| Err(Error::Inference("tokenizer failed".into())));
    scorer.expect_score_gibberish().never();

    let mut repo = MockRepo::new();
    repo.expect_create_analysis().never();

    let resp = send(app(scorer, repo), post_json("/analyze/", r#"{"input_text": "x"}"#)).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["detail"], "Internal Server Error");
}

#[tokio::test]
async fn out_of_range_score_is_never_persisted() {
    let mut scorer = MockScorer::new();
    scorer.expect_score_toxicity().returning(|_| Ok(1.5));
    scorer.expect_score_gibberish().returning(|_| Ok(0.5));

    let mut repo = MockRepo::new();
    repo.expect_create_analysis().never();

    let resp = send(app(scorer, repo), post_json("/analyze/", r#"{"input_text": "x"}"#)).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn database_failure_is_a_500() {
    let mut repo = MockRepo::new();
    repo.expect_create_analysis()
        .returning(|_| Err(Error::Database(sqlx::Error::PoolTimedOut)));

    let resp = send(
        app(StubScorer::new(), repo),
        post_json("/analyze/", r#"{"input_text": "hello"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn oversized_text_is_rejected_before_scoring() {
    let mut scorer = MockScorer::new();
    scorer.expect_score_toxicity().never();
    scorer.expect_score_gibberish().never();

    let body = serde_json::json!({ "input_text": "a".repeat(1001) }).to_string();
    let resp = send(app(scorer, MockRepo::new()), post_json("/analyze/", &body)).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let detail = json_body(resp).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("1000"), "detail: {detail}");
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let resp = send(
        app(StubScorer::new(), MockRepo::new()),
        post_json("/analyze/", r#"{"input_text": "#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["detail"].is_string());
}

#[tokio::test]
async fn wrong_field_type_is_a_client_error() {
    let resp = send(
        app(StubScorer::new(), MockRepo::new()),
        post_json("/analyze/", r#"{"input_text": 12}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_content_type_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/analyze/")
        .body(Body::from(r#"{"input_text": "hi"}"#))
        .unwrap();
    let resp = send(app(StubScorer::new(), MockRepo::new()), req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn analyses_uses_default_window() {
    let mut repo = MockRepo::new();
    repo.expect_list_analyses()
        .withf(|page| *page == Page { skip: 0, limit: 100 })
        .times(1)
        .returning(|_| Ok(vec![]));

    let resp = send(app(StubScorer::new(), repo), get("/analyses/")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn analyses_forwards_explicit_window() {
    let mut repo = MockRepo::new();
    repo.expect_list_analyses()
        .withf(|page| *page == Page { skip: 5, limit: 2 })
        .times(1)
        .returning(|_| Ok(vec![]));

    let resp = send(app(StubScorer::new(), repo), get("/analyses?skip=5&limit=2")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_windows_are_rejected() {
    for uri in [
        "/analyses/?skip=-1",
        "/analyses/?limit=-1",
        "/analyses/?limit=1001",
        "/analyses/?limit=ten",
    ] {
        let mut repo = MockRepo::new();
        repo.expect_list_analyses().never();

        let resp = send(app(StubScorer::new(), repo), get(uri)).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "uri {uri}");
        assert!(json_body(resp).await["detail"].is_string(), "uri {uri}");
    }
}

#[tokio::test]
async fn cors_allows_the_configured_origin_with_credentials() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/analyze/")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let resp = send(app(StubScorer::new(), MockRepo::new()), req).await;
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(headers["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn cors_ignores_other_origins() {
    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header("origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let resp = send(app(StubScorer::new(), MockRepo::new()), req).await;
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}
