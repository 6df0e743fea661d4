//! Health check endpoint handler.

use crate::api::AppState;
use crate::routing::DataSource;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// True when every gateway has a launch command
    pub ready: bool,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub gateways: Vec<GatewayStatus>,
}

/// Per-gateway configuration state.
#[derive(Debug, Serialize)]
pub struct GatewayStatus {
    pub name: String,
    pub source: DataSource,
    pub configured: bool,
}

/// GET /api/health - Liveness and configuration state.
///
/// Does not contact backends; `querygate gateways --check` probes them.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let gateways: Vec<GatewayStatus> = state
        .dispatcher
        .gateways()
        .iter()
        .map(|g| GatewayStatus {
            name: g.name().to_string(),
            source: g.source(),
            configured: g.is_configured(),
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        ready: gateways.iter().all(|g| g.configured),
        uptime_seconds: state.metrics_collector.uptime_seconds(),
        started_at: state.metrics_collector.started_at(),
        gateways,
    })
}
