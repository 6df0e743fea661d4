//! Backend gateways
//!
//! A [`Gateway`] wraps exactly one external backend reachable through a
//! session-oriented protocol: open a session, handshake, list callable
//! operations, invoke one with the query text, close.
//!
//! # Session policy
//!
//! Every call opens a fresh session and closes it before returning, on
//! success and on error. If the call future is dropped (cancellation or
//! a caller timeout) the session is dropped with it and the MCP backend
//! process is killed. Concurrent calls are bounded per gateway by a
//! semaphore, so no two callers ever share one session.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

pub mod error;
pub mod mcp;
pub mod protocol;

pub use error::GatewayError;
pub use mcp::{LaunchSpec, McpConnector, McpSession};

use crate::routing::DataSource;

/// One record returned by a backend. Its schema is backend-defined.
pub type Row = serde_json::Map<String, Value>;

/// Canonical operation names, in priority order.
pub const PREFERRED_OPERATIONS: &[&str] = &["query", "execute_query", "run_query", "sql_query"];

/// A live connection to one backend process.
///
/// Sessions are serially reusable: methods take `&mut self`, so one
/// session can never serve two callers at once.
#[async_trait]
pub trait BackendSession: Send {
    /// Perform the protocol handshake.
    async fn initialize(&mut self) -> Result<(), GatewayError>;

    /// Names of the backend's callable operations.
    async fn list_operations(&mut self) -> Result<Vec<String>, GatewayError>;

    /// Invoke one operation and return its records.
    async fn invoke(&mut self, operation: &str, arguments: Value)
        -> Result<Vec<Row>, GatewayError>;

    /// Release the session. Must be safe to call after a failure.
    async fn close(&mut self);

    /// Backend-reported server name, once initialized.
    fn server_name(&self) -> Option<&str> {
        None
    }
}

/// Opens new sessions against one backend.
#[async_trait]
pub trait SessionConnector: Send + Sync + 'static {
    async fn open(&self) -> Result<Box<dyn BackendSession>, GatewayError>;

    /// Human-readable target (e.g. the launch command).
    fn describe(&self) -> String;
}

/// Pick the operation to invoke.
///
/// The first canonical name present wins; otherwise the first operation
/// the backend listed; with no operations at all, `ToolUnavailable`.
pub fn select_operation<'a>(
    available: &'a [String],
    preferred: &[String],
) -> Result<&'a str, GatewayError> {
    preferred
        .iter()
        .find_map(|p| available.iter().find(|a| *a == p))
        .or_else(|| available.first())
        .map(String::as_str)
        .ok_or(GatewayError::ToolUnavailable)
}

/// Outcome of a connectivity probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub server_name: Option<String>,
    pub operations: Vec<String>,
    pub selected_operation: String,
}

/// Uniform query capability over one backend.
pub struct Gateway {
    name: String,
    source: DataSource,
    connector: Option<Arc<dyn SessionConnector>>,
    preferred_operations: Vec<String>,
    query_argument: String,
    permits: Semaphore,
}

impl Gateway {
    /// Create a gateway. `connector == None` means no backend is
    /// configured; every call then fails with `NotConfigured`.
    pub fn new(
        name: impl Into<String>,
        source: DataSource,
        connector: Option<Arc<dyn SessionConnector>>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            connector,
            preferred_operations: PREFERRED_OPERATIONS.iter().map(|s| s.to_string()).collect(),
            query_argument: "query".to_string(),
            permits: Semaphore::new(4),
        }
    }

    /// Override the canonical operation names.
    pub fn with_preferred_operations(mut self, preferred: Vec<String>) -> Self {
        self.preferred_operations = preferred;
        self
    }

    /// Override the argument name the query text is passed under.
    pub fn with_query_argument(mut self, argument: impl Into<String>) -> Self {
        self.query_argument = argument.into();
        self
    }

    /// Bound the number of sessions open at once, clamped to
    /// `1..=Semaphore::MAX_PERMITS`.
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.permits = Semaphore::new(max_sessions.clamp(1, Semaphore::MAX_PERMITS));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn is_configured(&self) -> bool {
        self.connector.is_some()
    }

    /// Launch target, if configured.
    pub fn target(&self) -> Option<String> {
        self.connector.as_ref().map(|c| c.describe())
    }

    /// Run the query text against the backend.
    ///
    /// The session is closed on every path that returns, and dropped
    /// (killing the backend) if this future is cancelled.
    pub async fn query(&self, query_text: &str) -> Result<Vec<Row>, GatewayError> {
        let (_permit, mut session) = self.open_session().await?;
        let outcome = self.run_query(session.as_mut(), query_text).await;
        session.close().await;
        outcome
    }

    /// Open a session, handshake, list operations and close again.
    pub async fn probe(&self) -> Result<ProbeReport, GatewayError> {
        let (_permit, mut session) = self.open_session().await?;
        let outcome = self.run_probe(session.as_mut()).await;
        session.close().await;
        outcome
    }

    async fn open_session(
        &self,
    ) -> Result<(SemaphorePermit<'_>, Box<dyn BackendSession>), GatewayError> {
        let connector = self
            .connector
            .as_ref()
            .ok_or_else(|| GatewayError::NotConfigured(self.name.clone()))?;

        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GatewayError::Connectivity("gateway is shutting down".into()))?;

        let session = connector.open().await?;
        Ok((permit, session))
    }

    async fn handshake(&self, session: &mut dyn BackendSession) -> Result<Vec<String>, GatewayError> {
        session.initialize().await?;
        let operations = session.list_operations().await?;
        tracing::debug!(
            gateway = %self.name,
            operations = operations.len(),
            "Listed backend operations"
        );
        Ok(operations)
    }

    async fn run_query(
        &self,
        session: &mut dyn BackendSession,
        query_text: &str,
    ) -> Result<Vec<Row>, GatewayError> {
        let operations = self.handshake(session).await?;
        let operation = select_operation(&operations, &self.preferred_operations)?;
        tracing::debug!(gateway = %self.name, operation, "Invoking backend operation");

        let mut arguments = serde_json::Map::new();
        arguments.insert(
            self.query_argument.clone(),
            Value::String(query_text.to_string()),
        );
        session.invoke(operation, Value::Object(arguments)).await
    }

    async fn run_probe(&self, session: &mut dyn BackendSession) -> Result<ProbeReport, GatewayError> {
        let operations = self.handshake(session).await?;
        let selected = select_operation(&operations, &self.preferred_operations)?.to_string();
        Ok(ProbeReport {
            server_name: session.server_name().map(String::from),
            operations,
            selected_operation: selected,
        })
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("target", &self.target())
            .finish()
    }
}
