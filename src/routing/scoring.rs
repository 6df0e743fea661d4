//! Scoring function for keyword-based query routing

use super::lexicon::Lexicon;
use serde::Serialize;

/// Boost for a region named alongside a fiscal term.
pub const REGION_FISCAL_BOOST: u32 = 10;

/// Boost for a bare region mention with no vehicle signal.
pub const REGION_ONLY_BOOST: u32 = 3;

/// Boost for a literal strong tax phrasing.
pub const TAX_PHRASE_BOOST: u32 = 3;

/// Upper bound on any reported confidence.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Confidence reported when scores tie.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Which region boost fired, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionBoost {
    None,
    /// Region plus a fiscal term
    Fiscal,
    /// Region with no vehicle keywords
    RegionOnly,
}

/// Raw scores and the evidence behind them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub vehicle_score: u32,
    pub tax_score: u32,
    pub vehicle_matches: Vec<String>,
    pub tax_matches: Vec<String>,
    pub region: Option<String>,
    pub region_boost: RegionBoost,
    pub phrase_boost: bool,
}

/// Score the query text against the lexicon.
///
/// `normalized` must already be lowercased.
pub fn score_query(lexicon: &Lexicon, normalized: &str) -> ScoreBreakdown {
    let vehicle_matches = lexicon.vehicle_matches(normalized);
    let tax_matches = lexicon.tax_matches(normalized);

    let vehicle_score = vehicle_matches.len() as u32;
    let mut tax_score = tax_matches.len() as u32;

    let region = lexicon.find_region(normalized);
    let region_boost = match region {
        Some(_) if lexicon.has_fiscal_trigger(normalized) => {
            tax_score += REGION_FISCAL_BOOST;
            RegionBoost::Fiscal
        }
        Some(_) if vehicle_score == 0 => {
            tax_score += REGION_ONLY_BOOST;
            RegionBoost::RegionOnly
        }
        _ => RegionBoost::None,
    };

    let phrase_boost = lexicon.has_strong_tax_phrase(normalized);
    if phrase_boost {
        tax_score += TAX_PHRASE_BOOST;
    }

    ScoreBreakdown {
        vehicle_score,
        tax_score,
        vehicle_matches: vehicle_matches.into_iter().map(String::from).collect(),
        tax_matches: tax_matches.into_iter().map(String::from).collect(),
        region: region.map(String::from),
        region_boost,
        phrase_boost,
    }
}

/// Confidence for the winning score.
///
/// The `+ 1` keeps the ratio below 1.0 and defined at zero; the cap
/// keeps it at or below [`MAX_CONFIDENCE`].
pub fn confidence(winner: u32, vehicle_score: u32, tax_score: u32) -> f64 {
    let total = vehicle_score as f64 + tax_score as f64 + 1.0;
    (winner as f64 / total).min(MAX_CONFIDENCE)
}
