//! textscore-core/src/http/mod.rs
//!
//! The axum application: routes, shared state and the cross-origin policy.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::AnalysisService;
use crate::Error;

pub mod error;
pub mod handlers;

pub use error::ApiError;

pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct AppState {
    pub analysis_service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(analysis_service: Arc<AnalysisService>) -> Self {
        Self { analysis_service }
    }
}

/// One allowed origin, credentials on. Methods and headers are mirrored back
/// because wildcards are not permitted together with credentials.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, Error> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| Error::Config(format!("invalid CORS origin '{}': {}", origin, e)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router, Error> {
    let router = Router::new()
        .route("/", get(handlers::read_root))
        .route("/analyze/", post(handlers::analyze_text))
        .route("/analyze", post(handlers::analyze_text))
        .route("/analyses/", get(handlers::get_analyses))
        .route("/analyses", get(handlers::get_analyses))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)?),
        );
    Ok(router)
}
