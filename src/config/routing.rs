//! Routing configuration

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Classifier and fan-out settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Terms added to the built-in vehicle lexicon
    pub extra_vehicle_terms: Vec<String>,
    /// Terms added to the built-in tax lexicon
    pub extra_tax_terms: Vec<String>,
    /// Answer queries naming both domains from both backends
    pub multi_source: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            extra_vehicle_terms: Vec::new(),
            extra_tax_terms: Vec::new(),
            multi_source: true,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_terms("routing.extra_vehicle_terms", &self.extra_vehicle_terms)?;
        validate_terms("routing.extra_tax_terms", &self.extra_tax_terms)
    }
}

fn validate_terms(field: &str, terms: &[String]) -> Result<(), ConfigError> {
    for (i, term) in terms.iter().enumerate() {
        if term.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("{}[{}]", field, i),
                "term cannot be blank",
            ));
        }
    }
    Ok(())
}
