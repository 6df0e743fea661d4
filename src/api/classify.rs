//! Classification endpoint handler.

use crate::api::{ApiError, AppState, ClassifyResponse, QueryRequest};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

/// POST /api/classify - Routing decision without contacting a backend.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Json(request) = request?;
    let text = request.text()?;
    Ok(Json(ClassifyResponse::new(
        state.dispatcher.classifier(),
        text,
        state.dispatcher.multi_source_enabled(),
    )))
}
