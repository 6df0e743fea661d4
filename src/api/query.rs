//! Query endpoint handler.

use crate::api::{ApiError, AppState, QueryRequest};
use crate::dispatch::QueryResult;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

/// POST /api/query - Classify and answer a query.
///
/// Backend failures are part of the envelope and still return 200; only
/// malformed or blank requests are rejected.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    request: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Json(request) = request?;
    let text = request.text()?;
    Ok(Json(state.dispatcher.answer(text).await))
}
