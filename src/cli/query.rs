//! Query command implementation

use crate::cli::output::{format_json, format_query_result};
use crate::cli::QueryArgs;
use crate::config::QuerygateConfig;
use crate::dispatch::Dispatcher;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// A query that came back as an error envelope. `output` is the
/// rendered envelope, printed like a successful result.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct QueryFailed {
    pub output: String,
    pub message: String,
}

/// Load, override and validate configuration for one-shot commands.
pub fn load_config(path: &Path) -> Result<QuerygateConfig, Box<dyn std::error::Error>> {
    let config = QuerygateConfig::load_or_default(path)?.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Log warnings and above to stderr so stdout stays parseable.
/// `RUST_LOG` takes precedence.
pub fn init_stderr_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Handle `querygate query`. A backend failure comes back as
/// [`QueryFailed`] carrying the rendered envelope.
pub async fn handle_query(args: &QueryArgs) -> Result<String, Box<dyn std::error::Error>> {
    let text = args.text.trim();
    if text.is_empty() {
        return Err("Query cannot be empty".into());
    }

    let config = load_config(&args.config)?;
    let dispatcher = Dispatcher::from_config(&config)?;
    let result = dispatcher.answer(text).await;

    let output = if args.json {
        format_json(&result)?
    } else {
        format_query_result(&result)
    };

    if result.is_success() {
        Ok(output)
    } else {
        Err(Box::new(QueryFailed {
            output,
            message: result.error.unwrap_or_else(|| "query failed".to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_blank_query_rejected() {
        let args = QueryArgs {
            text: "  ".to_string(),
            json: false,
            config: PathBuf::from("nonexistent.toml"),
        };
        let err = handle_query(&args).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_failed_query_returns_rendered_envelope() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[gateways.vehicle]\ncommand = []\n\n[gateways.tax]\ncommand = []",
        )
        .unwrap();
        let args = QueryArgs {
            text: "TX tax rate".to_string(),
            json: true,
            config: temp.path().to_path_buf(),
        };

        let err = handle_query(&args).await.unwrap_err();
        let failed = err.downcast_ref::<QueryFailed>().unwrap();
        let json: serde_json::Value = serde_json::from_str(&failed.output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["source"], "tax");
        assert!(failed.message.contains("tax-data"));
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 0").unwrap();
        assert!(load_config(temp.path()).is_err());
    }
}
