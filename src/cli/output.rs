//! Output formatting helpers for CLI commands

use crate::dispatch::{QueryResult, QueryStatus};
use crate::gateway::{Gateway, ProbeReport, Row};
use crate::routing::{DataSource, RegionBoost, RoutingDecision, ScoreBreakdown};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

/// View model for gateway display
#[derive(Debug, Clone, Serialize)]
pub struct GatewayView {
    pub name: String,
    pub source: DataSource,
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckView>,
}

/// Probe outcome for display
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckView {
    Ok(ProbeReport),
    Failed { kind: String, error: String },
}

impl From<&Gateway> for GatewayView {
    fn from(gateway: &Gateway) -> Self {
        Self {
            name: gateway.name().to_string(),
            source: gateway.source(),
            configured: gateway.is_configured(),
            target: gateway.target(),
            check: None,
        }
    }
}

/// Pretty JSON for any serializable view
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Format a query result: summary lines, then rows or the error.
pub fn format_query_result(result: &QueryResult) -> String {
    let status = match result.status {
        QueryStatus::Success => "success".green().to_string(),
        QueryStatus::Error => "error".red().to_string(),
    };

    let mut out = format!(
        "Status:     {}\nSource:     {}\nConfidence: {:.2}\nReason:     {}\n",
        status,
        result.source.as_str(),
        result.confidence,
        result.reason
    );

    match (&result.status, &result.error) {
        (QueryStatus::Error, Some(error)) => {
            out.push_str(&format!("Error:      {}\n", error.red()));
        }
        _ if result.rows.is_empty() => out.push_str("\nNo rows returned.\n"),
        _ => {
            out.push('\n');
            out.push_str(&format_rows_table(&result.rows));
        }
    }

    out
}

/// Rows as a table; columns are the union of keys in first-seen order.
pub fn format_rows_table(rows: &[Row]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.clone());

    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| Cell::new(row.get(*c).map(cell_text).unwrap_or_default())),
        );
    }

    table.to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Format a routing decision with its score breakdown
pub fn format_classification(
    decision: &RoutingDecision,
    breakdown: &ScoreBreakdown,
    multi_source: bool,
) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let source = if decision.is_ambiguous() {
        decision.source.as_str().yellow().to_string()
    } else {
        decision.source.as_str().green().to_string()
    };

    let region_boost = match breakdown.region_boost {
        RegionBoost::None => "none",
        RegionBoost::Fiscal => "region + fiscal term",
        RegionBoost::RegionOnly => "region only",
    };

    table.add_row(vec![Cell::new("Source"), Cell::new(source)]);
    table.add_row(vec![
        Cell::new("Confidence"),
        Cell::new(format!("{:.2}", decision.confidence)),
    ]);
    table.add_row(vec![Cell::new("Reason"), Cell::new(&decision.reason)]);
    table.add_row(vec![
        Cell::new("Vehicle score"),
        Cell::new(format!(
            "{} [{}]",
            breakdown.vehicle_score,
            breakdown.vehicle_matches.join(", ")
        )),
    ]);
    table.add_row(vec![
        Cell::new("Tax score"),
        Cell::new(format!(
            "{} [{}]",
            breakdown.tax_score,
            breakdown.tax_matches.join(", ")
        )),
    ]);
    table.add_row(vec![
        Cell::new("Region"),
        Cell::new(breakdown.region.as_deref().unwrap_or("-")),
    ]);
    table.add_row(vec![Cell::new("Region boost"), Cell::new(region_boost)]);
    table.add_row(vec![
        Cell::new("Tax phrase boost"),
        Cell::new(if breakdown.phrase_boost { "yes" } else { "no" }),
    ]);
    table.add_row(vec![
        Cell::new("Multi-source"),
        Cell::new(if multi_source { "yes" } else { "no" }),
    ]);

    table.to_string()
}

/// Format gateways as a table
pub fn format_gateways_table(gateways: &[GatewayView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let checked = gateways.iter().any(|g| g.check.is_some());
    let mut header = vec!["Name", "Source", "Command"];
    if checked {
        header.extend(["Check", "Operation"]);
    }
    table.set_header(header);

    for g in gateways {
        let command = match &g.target {
            Some(target) => target.clone(),
            None => "not configured".yellow().to_string(),
        };
        let mut row = vec![
            Cell::new(&g.name),
            Cell::new(g.source.as_str()),
            Cell::new(command),
        ];

        if checked {
            let (status, operation) = match &g.check {
                Some(CheckView::Ok(report)) => (
                    "OK".green().to_string(),
                    report.selected_operation.clone(),
                ),
                Some(CheckView::Failed { kind, .. }) => {
                    (format!("{} ({})", "Failed".red(), kind), "-".to_string())
                }
                None => ("-".to_string(), "-".to_string()),
            };
            row.push(Cell::new(status));
            row.push(Cell::new(operation));
        }

        table.add_row(row);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::routing::Classifier;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_rows_table_unions_columns() {
        let table = format_rows_table(&[
            row(json!({"state": "TX", "rate": 6.25})),
            row(json!({"state": "CA", "county": "Alameda"})),
        ]);
        assert!(table.contains("state"));
        assert!(table.contains("rate"));
        assert!(table.contains("county"));
        assert!(table.contains("Alameda"));
        assert!(table.contains("6.25"));
    }

    #[test]
    fn test_query_result_error_shows_message() {
        colored::control::set_override(false);
        let decision = Classifier::default().classify("TX tax rate");
        let result = QueryResult::failure(decision, &GatewayError::Timeout(std::time::Duration::from_secs(60)));
        let out = format_query_result(&result);
        assert!(out.contains("Status:     error"));
        assert!(out.contains("Source:     tax"));
        assert!(out.contains("timed out"));
    }

    #[test]
    fn test_query_result_empty_rows() {
        colored::control::set_override(false);
        let decision = Classifier::default().classify("tesla range");
        let out = format_query_result(&QueryResult::success(decision, vec![]));
        assert!(out.contains("No rows returned."));
    }

    #[test]
    fn test_classification_lists_matches() {
        let classifier = Classifier::default();
        let text = "Show California state tax data";
        let out = format_classification(
            &classifier.classify(text),
            &classifier.explain(text),
            false,
        );
        assert!(out.contains("california"));
        assert!(out.contains("region + fiscal term"));
    }

    #[test]
    fn test_gateways_table_marks_unconfigured() {
        colored::control::set_override(false);
        let gateway = Gateway::new("tax-data", DataSource::Tax, None);
        let out = format_gateways_table(&[GatewayView::from(&gateway)]);
        assert!(out.contains("tax-data"));
        assert!(out.contains("not configured"));
        assert!(!out.contains("Check"));
    }

    #[test]
    fn test_gateway_view_json_tags_check_status() {
        let view = GatewayView {
            name: "vehicle-data".to_string(),
            source: DataSource::Vehicle,
            configured: true,
            target: Some("mcp-vehicle".to_string()),
            check: Some(CheckView::Failed {
                kind: "connectivity".to_string(),
                error: "refused".to_string(),
            }),
        };
        let json: Value = serde_json::from_str(&format_json(&view).unwrap()).unwrap();
        assert_eq!(json["check"]["status"], "failed");
        assert_eq!(json["source"], "vehicle");
    }
}
