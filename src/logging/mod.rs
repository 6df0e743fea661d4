//! Structured logging helpers
//!
//! Filter construction for `tracing-subscriber`, request ID generation
//! and privacy-gated previews of query text and rows.

pub mod fields;
pub mod middleware;

pub use fields::{preview_query, preview_rows};
pub use middleware::generate_request_id;

/// Build filter directives string from LoggingConfig
///
/// The result has the form `base_level,querygate::component=level,...`.
/// Component keys are sorted so the directive string is stable.
///
/// # Examples
///
/// ```
/// use querygate::config::{LogFormat, LoggingConfig};
/// use querygate::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("dispatch".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
///     enable_content_logging: false,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,querygate::dispatch=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",querygate::{}={}", component, level));
        }
    }

    filter_str
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogFormat, LoggingConfig};
    use std::collections::HashMap;

    #[test]
    fn test_filter_without_components() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };
        assert_eq!(build_filter_directives(&config), "warn");
    }

    #[test]
    fn test_filter_with_multiple_components() {
        let mut component_levels = HashMap::new();
        component_levels.insert("routing".to_string(), "trace".to_string());
        component_levels.insert("gateway".to_string(), "debug".to_string());

        let config = LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Json,
            component_levels: Some(component_levels),
            enable_content_logging: false,
        };

        assert_eq!(
            build_filter_directives(&config),
            "info,querygate::gateway=debug,querygate::routing=trace"
        );
    }
}
