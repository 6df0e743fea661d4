//! Configuration module for querygate
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`QUERYGATE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use querygate::config::QuerygateConfig;
//!
//! let config = QuerygateConfig::default();
//! assert_eq!(config.server.port, 8000);
//!
//! let toml = r#"
//! [dispatch]
//! call_timeout_seconds = 15
//! "#;
//! let config: QuerygateConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.dispatch.call_timeout_seconds, 15);
//! ```

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod routing;
pub mod server;

pub use dispatch::DispatchConfig;
pub use error::ConfigError;
pub use gateway::{GatewayConfig, GatewaysConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use routing::RoutingConfig;
pub use server::ServerConfig;

use crate::routing::DataSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for querygate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuerygateConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Classifier and fan-out configuration
    pub routing: RoutingConfig,
    /// Gateway call policy
    pub dispatch: DispatchConfig,
    /// Backend launch settings
    pub gateways: GatewaysConfig,
}

impl QuerygateConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(Some(path))
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `QUERYGATE_*` overrides read through `lookup`.
    ///
    /// Invalid values are silently ignored (current values are kept).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("QUERYGATE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup("QUERYGATE_HOST") {
            self.server.host = host;
        }

        if let Some(level) = lookup("QUERYGATE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("QUERYGATE_LOG_FORMAT").and_then(|f| f.parse().ok()) {
            self.logging.format = format;
        }

        if let Some(secs) = lookup("QUERYGATE_CALL_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.dispatch.call_timeout_seconds = secs;
        }

        for (source, var) in [
            (DataSource::Vehicle, "QUERYGATE_VEHICLE_COMMAND"),
            (DataSource::Tax, "QUERYGATE_TAX_COMMAND"),
        ] {
            if let Some(command) = lookup(var) {
                let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
                if !parts.is_empty() {
                    self.gateways.get_mut(source).command = parts;
                }
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "port must be non-zero"));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_seconds",
                "request timeout must be non-zero",
            ));
        }

        self.routing.validate()?;
        self.gateways.validate()?;

        Ok(())
    }
}
