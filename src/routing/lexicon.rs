//! Keyword lexicon for query classification
//!
//! Static term sets for the two data domains plus the recognized region
//! identifiers. Everything here is read-only once built.

use regex::Regex;

/// Vehicle-data terms, matched as substrings of the lowercased query.
pub const VEHICLE_TERMS: &[&str] = &[
    "ev",
    "electric vehicle",
    "charging",
    "battery",
    "tesla",
    "vehicle",
    "car",
    "automotive",
    "range",
    "kwh",
    "model",
    "registration",
    "charging station",
];

/// Tax-data terms, matched as substrings of the lowercased query.
pub const TAX_TERMS: &[&str] = &[
    "tax",
    "tax rate",
    "sales tax",
    "local tax",
    "combined tax",
    "tax rank",
    "tax ranking",
    "state tax",
    "revenue",
    "taxation",
    "fiscal",
    "state-wise",
    "statewise",
];

/// Fiscal triggers that turn a region mention into a strong tax signal.
pub const FISCAL_TRIGGERS: &[&str] = &["tax", "rate", "ranking", "revenue"];

/// Literal phrasings that earn the secondary tax boost.
pub const STRONG_TAX_PHRASES: &[&str] = &["tax rate", "sales tax", "combined rate", "tax rank"];

/// Region identifiers: full names and postal abbreviations.
pub const REGIONS: &[&str] = &[
    "california",
    "ca",
    "texas",
    "tx",
    "new york",
    "ny",
    "florida",
    "fl",
    "illinois",
    "il",
    "pennsylvania",
    "pa",
    "ohio",
    "oh",
    "georgia",
    "ga",
    "north carolina",
    "nc",
    "michigan",
    "mi",
    "colorado",
    "co",
];

/// Whole-word terms that mark a query as strongly about vehicles when
/// deciding on multi-source fan-out.
pub const STRONG_VEHICLE_WORDS: &[&str] = &["tesla", "ev", "electric", "vehicle", "model"];

/// Whole-word terms that mark a query as strongly about taxes when
/// deciding on multi-source fan-out.
pub const STRONG_TAX_WORDS: &[&str] = &["tax", "tax rate", "sales tax"];

/// Weighted term sets and compiled whole-word matchers.
#[derive(Debug, Clone)]
pub struct Lexicon {
    vehicle_terms: Vec<String>,
    tax_terms: Vec<String>,
    fiscal_triggers: Vec<String>,
    strong_tax_phrases: Vec<String>,
    region_pattern: Regex,
    strong_vehicle_pattern: Regex,
    strong_tax_pattern: Regex,
}

impl Lexicon {
    /// Build a lexicon from the built-in term sets plus extra terms.
    ///
    /// Extra terms are lowercased and trimmed; duplicates of built-in
    /// terms are dropped so they are never counted twice.
    pub fn with_extra_terms(
        extra_vehicle: &[String],
        extra_tax: &[String],
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            vehicle_terms: merge_terms(VEHICLE_TERMS, extra_vehicle),
            tax_terms: merge_terms(TAX_TERMS, extra_tax),
            fiscal_triggers: to_owned(FISCAL_TRIGGERS),
            strong_tax_phrases: to_owned(STRONG_TAX_PHRASES),
            region_pattern: whole_word_pattern(REGIONS)?,
            strong_vehicle_pattern: whole_word_pattern(STRONG_VEHICLE_WORDS)?,
            strong_tax_pattern: whole_word_pattern(STRONG_TAX_WORDS)?,
        })
    }

    pub fn vehicle_terms(&self) -> &[String] {
        &self.vehicle_terms
    }

    pub fn tax_terms(&self) -> &[String] {
        &self.tax_terms
    }

    /// Vehicle terms appearing in the (already lowercased) text.
    pub fn vehicle_matches<'a>(&'a self, normalized: &str) -> Vec<&'a str> {
        substring_matches(&self.vehicle_terms, normalized)
    }

    /// Tax terms appearing in the (already lowercased) text.
    pub fn tax_matches<'a>(&'a self, normalized: &str) -> Vec<&'a str> {
        substring_matches(&self.tax_terms, normalized)
    }

    /// First region named as a whole word, if any.
    pub fn find_region<'t>(&self, normalized: &'t str) -> Option<&'t str> {
        self.region_pattern.find(normalized).map(|m| m.as_str())
    }

    pub fn has_fiscal_trigger(&self, normalized: &str) -> bool {
        self.fiscal_triggers
            .iter()
            .any(|t| normalized.contains(t.as_str()))
    }

    pub fn has_strong_tax_phrase(&self, normalized: &str) -> bool {
        self.strong_tax_phrases
            .iter()
            .any(|p| normalized.contains(p.as_str()))
    }

    pub fn has_strong_vehicle_word(&self, normalized: &str) -> bool {
        self.strong_vehicle_pattern.is_match(normalized)
    }

    pub fn has_strong_tax_word(&self, normalized: &str) -> bool {
        self.strong_tax_pattern.is_match(normalized)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::with_extra_terms(&[], &[]).expect("built-in lexicon patterns are valid")
    }
}

fn to_owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn merge_terms(builtin: &[&str], extra: &[String]) -> Vec<String> {
    let mut terms = to_owned(builtin);
    for term in extra {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

fn substring_matches<'a>(terms: &'a [String], normalized: &str) -> Vec<&'a str> {
    terms
        .iter()
        .filter(|t| normalized.contains(t.as_str()))
        .map(String::as_str)
        .collect()
}

/// Alternation of escaped terms anchored on word boundaries, longest
/// first so "new york" wins over a shorter overlapping alternative.
fn whole_word_pattern(terms: &[&str]) -> Result<Regex, regex::Error> {
    let mut sorted: Vec<&str> = terms.to_vec();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let escaped: Vec<String> = sorted.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"\b({})\b", escaped.join("|")))
}
