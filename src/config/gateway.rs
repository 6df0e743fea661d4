//! Backend gateway configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::error::ConfigError;
use crate::gateway::{Gateway, LaunchSpec, McpConnector, SessionConnector, PREFERRED_OPERATIONS};
use crate::routing::DataSource;

/// Launch and invocation settings for one backend.
///
/// A `[gateways.<source>]` table replaces that gateway's defaults; only
/// fields left out fall back to the generic defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Display name (defaults to "<source>-data")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Executable followed by its arguments; empty means not configured
    pub command: Vec<String>,
    /// Literal environment variables for the backend process
    pub env: BTreeMap<String, String>,
    /// Variables copied from this process's environment when set
    pub env_passthrough: Vec<String>,
    /// Canonical operation names, in priority order
    pub preferred_operations: Vec<String>,
    /// Argument name the query text is passed under
    pub query_argument: String,
    /// Sessions allowed open at once
    pub max_sessions: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: None,
            command: Vec::new(),
            env: BTreeMap::new(),
            env_passthrough: Vec::new(),
            preferred_operations: PREFERRED_OPERATIONS.iter().map(|s| s.to_string()).collect(),
            query_argument: "query".to_string(),
            max_sessions: 4,
        }
    }
}

impl GatewayConfig {
    /// BigQuery MCP server holding the vehicle dataset.
    pub fn vehicle_default() -> Self {
        Self {
            command: strings(&["uvx", "--from", "mcp-server-bigquery", "mcp-server-bigquery"]),
            env_passthrough: strings(&["GOOGLE_APPLICATION_CREDENTIALS", "GCP_PROJECT_ID"]),
            ..Default::default()
        }
    }

    /// S3 Tables MCP server holding the state tax table.
    pub fn tax_default() -> Self {
        let mut env = BTreeMap::new();
        env.insert("AWS_REGION".to_string(), "us-east-1".to_string());
        Self {
            command: strings(&["uvx", "awslabs.s3-tables-mcp-server@latest"]),
            env,
            env_passthrough: strings(&[
                "AWS_ACCESS_KEY_ID",
                "AWS_SECRET_ACCESS_KEY",
                "AWS_REGION",
            ]),
            ..Default::default()
        }
    }

    pub fn name_for(&self, source: DataSource) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-data", source))
    }

    /// Build the gateway, resolving passthrough variables through `lookup`.
    pub fn build<F>(&self, source: DataSource, lookup: F) -> Gateway
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = LaunchSpec::resolve_env(&self.env, &self.env_passthrough, lookup);
        let connector = LaunchSpec::new(&self.command, env)
            .map(|spec| Arc::new(McpConnector::new(spec)) as Arc<dyn SessionConnector>);

        Gateway::new(self.name_for(source), source, connector)
            .with_preferred_operations(self.preferred_operations.clone())
            .with_query_argument(self.query_argument.clone())
            .with_max_sessions(self.max_sessions)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("{}.name", field),
                "name cannot be blank",
            ));
        }
        if self.query_argument.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("{}.query_argument", field),
                "query argument cannot be empty",
            ));
        }
        if self.max_sessions == 0 {
            return Err(ConfigError::invalid(
                format!("{}.max_sessions", field),
                "must allow at least one session",
            ));
        }
        if self.max_sessions > Semaphore::MAX_PERMITS {
            return Err(ConfigError::invalid(
                format!("{}.max_sessions", field),
                format!("must not exceed {}", Semaphore::MAX_PERMITS),
            ));
        }
        Ok(())
    }
}

/// The two backend gateways
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaysConfig {
    #[serde(default = "GatewayConfig::vehicle_default")]
    pub vehicle: GatewayConfig,
    #[serde(default = "GatewayConfig::tax_default")]
    pub tax: GatewayConfig,
}

impl Default for GatewaysConfig {
    fn default() -> Self {
        Self {
            vehicle: GatewayConfig::vehicle_default(),
            tax: GatewayConfig::tax_default(),
        }
    }
}

impl GatewaysConfig {
    pub fn get(&self, source: DataSource) -> &GatewayConfig {
        match source {
            DataSource::Vehicle => &self.vehicle,
            DataSource::Tax => &self.tax,
        }
    }

    pub fn get_mut(&mut self, source: DataSource) -> &mut GatewayConfig {
        match source {
            DataSource::Vehicle => &mut self.vehicle,
            DataSource::Tax => &mut self.tax,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vehicle.validate("gateways.vehicle")?;
        self.tax.validate("gateways.tax")
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
