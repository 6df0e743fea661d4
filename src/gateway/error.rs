//! Error types for gateway operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while querying a backend through a gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Gateway has no launch command configured.
    #[error("Gateway '{0}' has no backend session configured")]
    NotConfigured(String),

    /// Backend process could not be started or the handshake failed.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Call exceeded the caller-imposed deadline.
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Backend reported zero callable operations.
    #[error("Backend exposes no callable operations")]
    ToolUnavailable,

    /// Backend spoke the protocol incorrectly.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Backend ran the operation and reported a failure.
    #[error("Operation '{operation}' failed: {message}")]
    Invocation { operation: String, message: String },
}

impl GatewayError {
    /// True for failures in reaching the backend rather than in the
    /// operation it ran.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            GatewayError::NotConfigured(_)
                | GatewayError::Connectivity(_)
                | GatewayError::Timeout(_)
                | GatewayError::Protocol(_)
        )
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::NotConfigured(_) => "not_configured",
            GatewayError::Connectivity(_) => "connectivity",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::ToolUnavailable => "tool_unavailable",
            GatewayError::Protocol(_) => "protocol",
            GatewayError::Invocation { .. } => "invocation",
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Connectivity(e.to_string())
    }
}
