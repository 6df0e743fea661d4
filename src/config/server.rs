//! HTTP server configuration

use serde::{Deserialize, Serialize};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a whole HTTP request, backend call included
    pub request_timeout_seconds: u64,
    /// Origins allowed by CORS; `"*"` allows any, empty allows none
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 300,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout_seconds, 300);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_server_config_empty_cors() {
        let config: ServerConfig = toml::from_str("cors_origins = []").unwrap();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.port, 8000);
    }
}
