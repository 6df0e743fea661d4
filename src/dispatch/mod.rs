//! Query dispatch
//!
//! Turns query text into a [`QueryResult`]: classify, pick the gateway
//! for the decided source, call it under the configured timeout and
//! shape the outcome into the result envelope.
//!
//! A query moves through `Received → Classified → Dispatching →
//! {Succeeded | Failed}`. A gateway failure is terminal: the query is
//! never re-routed to the other source.

pub mod result;

pub use result::{QueryResult, QueryStatus, ResultSource, SOURCE_FIELD};

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::{ConfigError, QuerygateConfig};
use crate::gateway::{Gateway, GatewayError, Row};
use crate::logging::{generate_request_id, preview_query, preview_rows};
use crate::metrics;
use crate::routing::{Classifier, DataSource, Lexicon};

/// Lifecycle phase of one query, as logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Received,
    Classified,
    Dispatching,
    Succeeded,
    Failed,
}

impl DispatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchPhase::Received => "received",
            DispatchPhase::Classified => "classified",
            DispatchPhase::Dispatching => "dispatching",
            DispatchPhase::Succeeded => "succeeded",
            DispatchPhase::Failed => "failed",
        }
    }

    fn finished(result: &QueryResult) -> Self {
        if result.is_success() {
            DispatchPhase::Succeeded
        } else {
            DispatchPhase::Failed
        }
    }
}

/// Classifier plus one gateway per data source.
///
/// Constructed once at startup and shared behind an `Arc`; it holds no
/// mutable state of its own.
#[derive(Debug)]
pub struct Dispatcher {
    classifier: Arc<Classifier>,
    vehicle: Gateway,
    tax: Gateway,
    call_timeout: Option<Duration>,
    multi_source: bool,
    log_content: bool,
}

impl Dispatcher {
    /// Build a dispatcher. Each gateway must serve the slot it is given.
    pub fn new(
        classifier: Arc<Classifier>,
        vehicle: Gateway,
        tax: Gateway,
    ) -> Result<Self, ConfigError> {
        for (gateway, expected) in [(&vehicle, DataSource::Vehicle), (&tax, DataSource::Tax)] {
            if gateway.source() != expected {
                return Err(ConfigError::invalid(
                    format!("gateways.{}", expected),
                    format!(
                        "gateway '{}' serves {} data",
                        gateway.name(),
                        gateway.source()
                    ),
                ));
            }
        }

        Ok(Self {
            classifier,
            vehicle,
            tax,
            call_timeout: None,
            multi_source: false,
            log_content: false,
        })
    }

    /// Build classifier and gateways from configuration, resolving
    /// passthrough variables from the process environment.
    pub fn from_config(config: &QuerygateConfig) -> Result<Self, ConfigError> {
        let lexicon = Lexicon::with_extra_terms(
            &config.routing.extra_vehicle_terms,
            &config.routing.extra_tax_terms,
        )
        .map_err(|e| ConfigError::invalid("routing", e.to_string()))?;

        let lookup = |name: &str| std::env::var(name).ok();
        let vehicle = config.gateways.vehicle.build(DataSource::Vehicle, lookup);
        let tax = config.gateways.tax.build(DataSource::Tax, lookup);

        Ok(Self::new(Arc::new(Classifier::new(lexicon)), vehicle, tax)?
            .with_call_timeout(config.dispatch.call_timeout())
            .with_multi_source(config.routing.multi_source)
            .with_content_logging(config.logging.enable_content_logging))
    }

    /// Bound every gateway call. `None` waits indefinitely.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Let [`answer`](Self::answer) fan out to both gateways.
    pub fn with_multi_source(mut self, enabled: bool) -> Self {
        self.multi_source = enabled;
        self
    }

    /// Include query text and row previews in log events.
    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.log_content = enabled;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn gateway(&self, source: DataSource) -> &Gateway {
        match source {
            DataSource::Vehicle => &self.vehicle,
            DataSource::Tax => &self.tax,
        }
    }

    pub fn gateways(&self) -> [&Gateway; 2] {
        [&self.vehicle, &self.tax]
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }

    pub fn multi_source_enabled(&self) -> bool {
        self.multi_source
    }

    /// Route the query to exactly one gateway.
    ///
    /// Never fails: backend failures come back as an error envelope that
    /// still carries the routing decision.
    pub async fn dispatch(&self, query: &str) -> QueryResult {
        let span = tracing::info_span!("dispatch", request_id = %generate_request_id());
        self.dispatch_single(query, Instant::now())
            .instrument(span)
            .await
    }

    /// Answer a query, fanning out to both gateways when it names both
    /// domains strongly and multi-source is enabled.
    pub async fn answer(&self, query: &str) -> QueryResult {
        let span = tracing::info_span!("dispatch", request_id = %generate_request_id());
        async {
            let started = Instant::now();
            if self.multi_source && self.classifier.is_multi_source(query) {
                self.dispatch_multi(query, started).await
            } else {
                self.dispatch_single(query, started).await
            }
        }
        .instrument(span)
        .await
    }

    async fn dispatch_single(&self, query: &str, started: Instant) -> QueryResult {
        self.log_received(query);

        let decision = self.classifier.classify(query);
        tracing::info!(
            phase = DispatchPhase::Classified.as_str(),
            source = %decision.source,
            confidence = decision.confidence,
            reason = %decision.reason,
            "Query classified"
        );

        let gateway = self.gateway(decision.source);
        tracing::debug!(
            phase = DispatchPhase::Dispatching.as_str(),
            gateway = gateway.name(),
            "Calling gateway"
        );

        let result = match self.call_gateway(gateway, query).await {
            Ok(rows) => QueryResult::success(decision, rows),
            Err(e) => QueryResult::failure(decision, &e),
        };

        self.finish(result, started)
    }

    async fn dispatch_multi(&self, query: &str, started: Instant) -> QueryResult {
        self.log_received(query);

        let decision = self.classifier.classify(query);
        tracing::info!(
            phase = DispatchPhase::Classified.as_str(),
            source = ResultSource::MultiSource.as_str(),
            confidence = decision.confidence,
            "Query names both domains"
        );
        tracing::debug!(
            phase = DispatchPhase::Dispatching.as_str(),
            gateways = ?[self.vehicle.name(), self.tax.name()],
            "Calling both gateways"
        );

        let (vehicle, tax) = tokio::join!(
            self.call_gateway(&self.vehicle, query),
            self.call_gateway(&self.tax, query)
        );

        let result = QueryResult::merged(
            decision,
            vec![(DataSource::Vehicle, vehicle), (DataSource::Tax, tax)],
        );

        self.finish(result, started)
    }

    /// One gateway call under the configured timeout.
    ///
    /// On expiry the call future is dropped, which drops its session and
    /// kills the backend process.
    async fn call_gateway(&self, gateway: &Gateway, query: &str) -> Result<Vec<Row>, GatewayError> {
        let outcome = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, gateway.query(query)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(GatewayError::Timeout(limit)),
            },
            None => gateway.query(query).await,
        };

        match &outcome {
            Ok(rows) => tracing::debug!(
                gateway = gateway.name(),
                rows = rows.len(),
                preview = preview_rows(rows, self.log_content).as_deref(),
                "Gateway answered"
            ),
            Err(e) => {
                metrics::record_gateway_error(gateway.name(), e.kind());
                tracing::warn!(
                    gateway = gateway.name(),
                    kind = e.kind(),
                    error = %e,
                    "Gateway call failed"
                );
            }
        }

        outcome
    }

    fn log_received(&self, query: &str) {
        tracing::debug!(
            phase = DispatchPhase::Received.as_str(),
            query_len = query.len(),
            query = preview_query(query, self.log_content).as_deref(),
            "Query received"
        );
    }

    fn finish(&self, result: QueryResult, started: Instant) -> QueryResult {
        let elapsed = started.elapsed();
        metrics::record_query(result.source.as_str(), result.status.as_str(), elapsed);

        tracing::info!(
            phase = DispatchPhase::finished(&result).as_str(),
            source = result.source.as_str(),
            rows = result.rows.len(),
            latency_ms = elapsed.as_millis() as u64,
            "Query finished"
        );

        result
    }
}
