//! # Metrics Collection Module
//!
//! Prometheus export of query traffic, served at `GET /metrics`.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `querygate_queries_total{source, status}` - Answered queries
//! - `querygate_gateway_errors_total{gateway, kind}` - Failed gateway calls
//!
//! **Histograms:**
//! - `querygate_dispatch_duration_seconds{source}` - Classification through result

pub mod handler;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::{Duration, Instant};

pub const QUERIES_TOTAL: &str = "querygate_queries_total";
pub const GATEWAY_ERRORS_TOTAL: &str = "querygate_gateway_errors_total";
pub const DISPATCH_DURATION_SECONDS: &str = "querygate_dispatch_duration_seconds";

/// Record one answered query.
pub fn record_query(source: &str, status: &str, elapsed: Duration) {
    metrics::counter!(
        QUERIES_TOTAL,
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(DISPATCH_DURATION_SECONDS, "source" => source.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record one failed gateway call.
pub fn record_gateway_error(gateway: &str, kind: &str) {
    metrics::counter!(
        GATEWAY_ERRORS_TOTAL,
        "gateway" => gateway.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Process uptime and Prometheus rendering.
pub struct MetricsCollector {
    start_time: Instant,
    started_at: DateTime<Utc>,
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(prometheus_handle: PrometheusHandle) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            prometheus_handle,
        }
    }

    /// Seconds since the collector was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Backend calls spawn processes and run queries, so duration buckets
/// span from sub-second to the default call timeout.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(DISPATCH_DURATION_SECONDS.to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Install the recorder, or fall back to a detached handle when one is
/// already installed (several routers in one test process).
pub fn setup_metrics_or_detached() -> PrometheusHandle {
    setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        PrometheusBuilder::new().build_recorder().handle()
    })
}
