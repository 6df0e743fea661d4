//! Classify command implementation

use crate::api::ClassifyResponse;
use crate::cli::output::{format_classification, format_json};
use crate::cli::ClassifyArgs;
use crate::config::QuerygateConfig;
use crate::routing::{Classifier, Lexicon};

/// Handle `querygate classify`. Never contacts a backend.
pub fn handle_classify(args: &ClassifyArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = QuerygateConfig::load_or_default(&args.config)?;
    config.routing.validate()?;

    let lexicon = Lexicon::with_extra_terms(
        &config.routing.extra_vehicle_terms,
        &config.routing.extra_tax_terms,
    )?;
    let classifier = Classifier::new(lexicon);

    let response = ClassifyResponse::new(&classifier, &args.text, config.routing.multi_source);

    if args.json {
        Ok(format_json(&response)?)
    } else {
        Ok(format_classification(
            &response.decision,
            &response.breakdown,
            response.multi_source,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(text: &str, json: bool) -> ClassifyArgs {
        ClassifyArgs {
            text: text.to_string(),
            json,
            config: PathBuf::from("nonexistent.toml"),
        }
    }

    #[test]
    fn test_classify_json_output() {
        let out = handle_classify(&args("TX tax rate", true)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["source"], "tax");
        assert_eq!(json["breakdown"]["region"], "tx");
        assert!(json["confidence"].as_f64().unwrap() >= 0.9);
    }

    #[test]
    fn test_classify_uses_extra_terms_from_config() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[routing]\nextra_vehicle_terms = [\"rivian\"]").unwrap();

        let out = handle_classify(&ClassifyArgs {
            text: "rivian".to_string(),
            json: true,
            config: temp.path().to_path_buf(),
        })
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["source"], "vehicle");
        assert_eq!(json["breakdown"]["vehicle_score"], 1);
    }
}
