// File: textscore-core/tests/test_utils/mod.rs

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use mockall::mock;
use serde_json::Value;
use tower::ServiceExt;

use textscore_common::models::{NewTextAnalysis, Page, TextAnalysis};
use textscore_common::traits::{TextAnalysisRepo, TextScorer};
use textscore_core::http::{build_router, AppState, DEFAULT_CORS_ORIGIN};
use textscore_core::services::AnalysisService;
use textscore_core::Error;

mock! {
    pub Repo {}

    #[async_trait]
    impl TextAnalysisRepo for Repo {
        async fn create_analysis(&self, analysis: &NewTextAnalysis) -> Result<TextAnalysis, Error>;
        async fn list_analyses(&self, page: Page) -> Result<Vec<TextAnalysis>, Error>;
    }
}

mock! {
    pub Scorer {}

    impl TextScorer for Scorer {
        fn score_toxicity(&self, text: &str) -> Result<f64, Error>;
        fn score_gibberish(&self, text: &str) -> Result<f64, Error>;
    }
}

/// What the database would hand back for `new`.
pub fn stored(id: i64, new: &NewTextAnalysis) -> TextAnalysis {
    TextAnalysis {
        id,
        input_text: new.input_text.clone(),
        toxicity_score: new.toxicity_score,
        gibberish_score: new.gibberish_score,
        created_at: Utc::now(),
    }
}

pub fn app(scorer: impl TextScorer + 'static, repo: impl TextAnalysisRepo + 'static) -> Router {
    let service = AnalysisService::new(Arc::new(scorer), Arc::new(repo));
    build_router(AppState::new(Arc::new(service)), DEFAULT_CORS_ORIGIN)
        .expect("router builds with the default origin")
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.expect("router is infallible")
}

pub async fn json_body(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}
