use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use textscore_common::models::{Page, TextAnalysis, TextAnalysisCreate};

use super::{ApiError, AppState};

/// Query string for `GET /analyses/`: `?skip=0&limit=100`.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    skip: Option<i64>,
    limit: Option<i64>,
}

pub async fn read_root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Text Analysis API" }))
}

pub async fn analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<TextAnalysisCreate>, JsonRejection>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let Json(request) = payload?;
    let record = state.analysis_service.analyze(request).await?;
    Ok(Json(record))
}

pub async fn get_analyses(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<TextAnalysis>>, ApiError> {
    let Query(pagination) = query?;
    let page = Page::new(pagination.skip, pagination.limit)?;
    let records = state.analysis_service.list(page).await?;
    Ok(Json(records))
}
