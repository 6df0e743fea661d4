//! Query classification
//!
//! Decides which data source should answer a natural-language query. The
//! decision is a deterministic keyword score over a static [`Lexicon`],
//! never a trained model, so every routing outcome can be explained from
//! the matched terms.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod lexicon;
pub mod scoring;

pub use lexicon::Lexicon;
pub use scoring::{confidence, score_query, RegionBoost, ScoreBreakdown};

use scoring::DEFAULT_CONFIDENCE;

/// Backend data source a query can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Tabular electric-vehicle data
    Vehicle,
    /// Tabular state and local tax-rate data
    Tax,
}

impl DataSource {
    /// Source used when the scores tie.
    pub const DEFAULT: DataSource = DataSource::Vehicle;

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Vehicle => "vehicle",
            DataSource::Tax => "tax",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    pub source: DataSource,
    /// Relative keyword strength in `[0.0, 0.95]`
    pub confidence: f64,
    pub reason: String,
    pub query: String,
    /// Scores tied and the default source was chosen
    pub ambiguous: bool,
}

impl RoutingDecision {
    pub fn is_ambiguous(&self) -> bool {
        self.ambiguous
    }
}

/// Keyword classifier over a read-only lexicon.
///
/// Holds no mutable state, so one instance can be shared across tasks
/// behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    lexicon: Lexicon,
}

impl Classifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Raw scores and matched evidence for a query.
    pub fn explain(&self, query: &str) -> ScoreBreakdown {
        score_query(&self.lexicon, &query.to_lowercase())
    }

    /// Route a query. Always returns a decision, even for empty input.
    pub fn classify(&self, query: &str) -> RoutingDecision {
        let breakdown = self.explain(query);
        let decision = decide(&breakdown, query);

        tracing::debug!(
            vehicle_score = breakdown.vehicle_score,
            tax_score = breakdown.tax_score,
            region = ?breakdown.region,
            region_boost = ?breakdown.region_boost,
            phrase_boost = breakdown.phrase_boost,
            source = %decision.source,
            confidence = decision.confidence,
            "Classified query"
        );

        decision
    }

    /// True when the query names both domains strongly enough to be
    /// answered from both sources at once.
    pub fn is_multi_source(&self, query: &str) -> bool {
        let normalized = query.to_lowercase();
        self.lexicon.has_strong_vehicle_word(&normalized)
            && self.lexicon.has_strong_tax_word(&normalized)
    }
}

fn decide(breakdown: &ScoreBreakdown, query: &str) -> RoutingDecision {
    let (vehicle, tax) = (breakdown.vehicle_score, breakdown.tax_score);

    if vehicle > tax {
        RoutingDecision {
            source: DataSource::Vehicle,
            confidence: confidence(vehicle, vehicle, tax),
            reason: format!("Query contains vehicle-related keywords (score: {})", vehicle),
            query: query.to_string(),
            ambiguous: false,
        }
    } else if tax > vehicle {
        RoutingDecision {
            source: DataSource::Tax,
            confidence: confidence(tax, vehicle, tax),
            reason: format!("Query contains tax/region-related keywords (score: {})", tax),
            query: query.to_string(),
            ambiguous: false,
        }
    } else {
        RoutingDecision {
            source: DataSource::DEFAULT,
            confidence: DEFAULT_CONFIDENCE,
            reason: format!(
                "Ambiguous query - defaulting to {} data",
                DataSource::DEFAULT
            ),
            query: query.to_string(),
            ambiguous: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classifier() -> Classifier {
        Classifier::default()
    }

    #[test]
    fn vehicle_query_routes_to_vehicle() {
        let decision = classifier().classify("What is the range of Tesla Model 3?");
        assert_eq!(decision.source, DataSource::Vehicle);
        assert!(decision.confidence > 0.5);
        assert_eq!(decision.query, "What is the range of Tesla Model 3?");
    }

    #[test]
    fn state_tax_query_routes_to_tax() {
        let decision = classifier().classify("Show California state tax data");
        assert_eq!(decision.source, DataSource::Tax);
        assert!(decision.confidence > 0.5);
    }

    #[test]
    fn no_keywords_defaults_with_half_confidence() {
        let decision = classifier().classify("Show me data");
        assert_eq!(decision.source, DataSource::DEFAULT);
        assert_eq!(decision.confidence, 0.5);
        assert!(decision.is_ambiguous());
    }

    #[test]
    fn empty_query_defaults() {
        let decision = classifier().classify("");
        assert_eq!(decision.source, DataSource::DEFAULT);
        assert_eq!(decision.confidence, 0.5);
    }

    #[test]
    fn region_abbreviation_with_tax_rate_is_near_certain() {
        let decision = classifier().classify("TX tax rate");
        assert_eq!(decision.source, DataSource::Tax);
        assert!(decision.confidence >= 0.9);
        assert!(decision.confidence <= 0.95);
    }

    #[test]
    fn nonzero_tie_defaults() {
        // one vehicle term ("battery"), one tax term ("fiscal")
        let decision = classifier().classify("battery fiscal");
        assert_eq!(decision.source, DataSource::DEFAULT);
        assert_eq!(decision.confidence, 0.5);
        assert!(decision.is_ambiguous());
    }

    #[test]
    fn single_keyword_is_not_ambiguous() {
        let decision = classifier().classify("tesla");
        assert_eq!(decision.source, DataSource::Vehicle);
        assert_eq!(decision.confidence, 0.5);
        assert!(!decision.is_ambiguous());

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["ambiguous"], false);
    }

    #[test]
    fn region_inside_word_does_not_boost() {
        let breakdown = classifier().explain("cats");
        assert_eq!(breakdown.region, None);
        assert_eq!(breakdown.tax_score, 0);
    }

    #[test]
    fn original_text_is_preserved() {
        let decision = classifier().classify("  TESLA Battery  ");
        assert_eq!(decision.query, "  TESLA Battery  ");
    }

    #[test]
    fn multi_source_requires_both_domains_as_words() {
        let c = classifier();
        assert!(c.is_multi_source("Tesla registrations and sales tax in Texas"));
        assert!(!c.is_multi_source("Texas tax revenue"));
        assert!(!c.is_multi_source("Tesla Model 3 range"));
    }

    #[test]
    fn data_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DataSource::Vehicle).unwrap(),
            "\"vehicle\""
        );
        assert_eq!(serde_json::to_string(&DataSource::Tax).unwrap(), "\"tax\"");
    }

    proptest! {
        #[test]
        fn prop_confidence_is_bounded(query in "\\PC{0,80}") {
            let decision = Classifier::default().classify(&query);
            prop_assert!(decision.confidence >= 0.0);
            prop_assert!(decision.confidence <= 0.95);
        }

        #[test]
        fn prop_vehicle_only_queries_route_to_vehicle(
            picks in proptest::sample::subsequence(
                vec!["tesla", "battery", "charging", "kwh", "automotive"],
                2..=5,
            )
        ) {
            let query = picks.join(" ");
            let decision = Classifier::default().classify(&query);
            prop_assert_eq!(decision.source, DataSource::Vehicle);
            prop_assert!(decision.confidence > 0.5);
            prop_assert!(decision.confidence <= 0.95);
        }

        #[test]
        fn prop_tax_only_queries_route_to_tax(
            picks in proptest::sample::subsequence(
                vec!["taxation", "fiscal", "statewise"],
                2..=3,
            )
        ) {
            let query = picks.join(" ");
            let decision = Classifier::default().classify(&query);
            prop_assert_eq!(decision.source, DataSource::Tax);
            prop_assert!(decision.confidence > 0.5);
        }

        #[test]
        fn prop_keywordless_queries_default(query in "[qwxzjk ]{0,40}") {
            let decision = Classifier::default().classify(&query);
            prop_assert_eq!(decision.source, DataSource::DEFAULT);
            prop_assert_eq!(decision.confidence, 0.5);
        }
    }
}
