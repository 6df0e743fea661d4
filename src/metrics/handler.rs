//! # Metrics HTTP Handlers

use crate::api::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Handler for GET /metrics endpoint (Prometheus text format).
///
/// Always returns 200, with an empty body before anything is recorded.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = state.metrics_collector.render_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics,
    )
}
