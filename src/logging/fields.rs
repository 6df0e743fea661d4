//! Privacy-gated log field helpers
//!
//! Query text and backend rows may carry sensitive data. They are only
//! rendered into logs when content logging is enabled.

use crate::gateway::Row;

const PREVIEW_CHARS: usize = 100;

/// Preview of the query text, or None when content logging is disabled.
///
/// # Examples
///
/// ```
/// use querygate::logging::preview_query;
///
/// assert_eq!(preview_query("TX tax rate", true).as_deref(), Some("TX tax rate"));
/// assert!(preview_query("TX tax rate", false).is_none());
/// ```
pub fn preview_query(query: &str, enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging || query.is_empty() {
        return None;
    }
    Some(truncate_chars(query, PREVIEW_CHARS))
}

/// Preview of the first row as compact JSON.
pub fn preview_rows(rows: &[Row], enable_content_logging: bool) -> Option<String> {
    if !enable_content_logging {
        return None;
    }
    let first = rows.first()?;
    let json = serde_json::to_string(first).ok()?;
    Some(truncate_chars(&json, PREVIEW_CHARS))
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
