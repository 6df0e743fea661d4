//! Uniform result envelope returned for every query

use crate::gateway::{GatewayError, Row};
use crate::routing::{DataSource, RoutingDecision};
use serde::Serialize;
use serde_json::Value;

/// Key added to each row of a multi-source result naming its backend.
pub const SOURCE_FIELD: &str = "_source";

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Success,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Success => "success",
            QueryStatus::Error => "error",
        }
    }
}

/// Which backend produced (or should have produced) the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Vehicle,
    Tax,
    /// Rows merged from both backends
    MultiSource,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Vehicle => "vehicle",
            ResultSource::Tax => "tax",
            ResultSource::MultiSource => "multi_source",
        }
    }
}

impl From<DataSource> for ResultSource {
    fn from(source: DataSource) -> Self {
        match source {
            DataSource::Vehicle => ResultSource::Vehicle,
            DataSource::Tax => ResultSource::Tax,
        }
    }
}

/// Result envelope.
///
/// `data` is meaningful only on success and `error` is present only on
/// error; the constructors are the only way the two are set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub status: QueryStatus,
    pub query: String,
    pub source: ResultSource,
    pub confidence: f64,
    pub reason: String,
    #[serde(rename = "data")]
    pub rows: Vec<Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl QueryResult {
    /// Rows returned by the chosen backend. Zero rows is still success.
    pub fn success(decision: RoutingDecision, rows: Vec<Row>) -> Self {
        Self {
            status: QueryStatus::Success,
            source: decision.source.into(),
            confidence: decision.confidence,
            reason: decision.reason,
            query: decision.query,
            rows,
            error: None,
            error_kind: None,
        }
    }

    /// Backend failure, keeping the routing metadata.
    pub fn failure(decision: RoutingDecision, error: &GatewayError) -> Self {
        Self {
            status: QueryStatus::Error,
            source: decision.source.into(),
            confidence: decision.confidence,
            reason: decision.reason,
            query: decision.query,
            rows: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind().to_string()),
        }
    }

    /// Merge per-backend outcomes under a multi-source envelope.
    ///
    /// Success if any backend answered; failed backends are named in the
    /// reason. Error only if every backend failed.
    pub fn merged(
        decision: RoutingDecision,
        outcomes: Vec<(DataSource, Result<Vec<Row>, GatewayError>)>,
    ) -> Self {
        let mut rows = Vec::new();
        let mut failures = Vec::new();
        let mut answered = 0usize;

        for (source, outcome) in outcomes {
            match outcome {
                Ok(source_rows) => {
                    answered += 1;
                    rows.extend(source_rows.into_iter().map(|mut row| {
                        row.insert(
                            SOURCE_FIELD.to_string(),
                            Value::String(source.as_str().to_string()),
                        );
                        row
                    }));
                }
                Err(e) => failures.push(format!("{}: {}", source, e)),
            }
        }

        let mut reason = "Query names both vehicle and tax data - fetched from both sources".to_string();

        if answered == 0 {
            return Self {
                status: QueryStatus::Error,
                query: decision.query,
                source: ResultSource::MultiSource,
                confidence: decision.confidence,
                reason,
                rows: Vec::new(),
                error: Some(failures.join("; ")),
                error_kind: Some("multi_source".to_string()),
            };
        }

        if !failures.is_empty() {
            reason.push_str(&format!(" (partial: {})", failures.join("; ")));
        }

        Self {
            status: QueryStatus::Success,
            query: decision.query,
            source: ResultSource::MultiSource,
            confidence: decision.confidence,
            reason,
            rows,
            error: None,
            error_kind: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}
