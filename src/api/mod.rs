//! # HTTP API
//!
//! JSON endpoints in front of the [`Dispatcher`].
//!
//! ## Endpoints
//!
//! - `POST /api/query` - Classify and answer a query
//! - `POST /api/classify` - Routing decision and score breakdown only
//! - `GET /api/health` - Liveness and gateway configuration
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use querygate::api::{create_router, AppState};
//! use querygate::config::QuerygateConfig;
//! use querygate::dispatch::Dispatcher;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(QuerygateConfig::default());
//! let dispatcher = Arc::new(Dispatcher::from_config(&config)?);
//! let state = Arc::new(AppState::new(dispatcher, config));
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Backend failures are reported inside the query envelope with a 200
//! status. Malformed requests get an error body:
//! ```json
//! {
//!   "error": {
//!     "message": "Query cannot be empty",
//!     "type": "invalid_request_error",
//!     "code": "invalid_request_error"
//!   }
//! }
//! ```

mod classify;
mod health;
mod query;
pub mod types;

pub use health::{GatewayStatus, HealthResponse};
pub use types::*;

use crate::config::QuerygateConfig;
use crate::dispatch::Dispatcher;
use crate::metrics::MetricsCollector;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub config: Arc<QuerygateConfig>,
    /// Uptime tracking and Prometheus rendering
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Create application state around an already-built dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>, config: Arc<QuerygateConfig>) -> Self {
        let prometheus_handle = crate::metrics::setup_metrics_or_detached();

        Self {
            dispatcher,
            config,
            metrics_collector: Arc::new(MetricsCollector::new(prometheus_handle)),
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/api/query", post(query::handle))
        .route("/api/classify", post(classify::handle))
        .route("/api/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins. `"*"` allows any origin; entries
/// that are not valid header values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(parsed)
}
