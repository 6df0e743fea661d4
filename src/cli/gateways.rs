//! Gateways command implementation

use crate::cli::output::{format_gateways_table, format_json, CheckView, GatewayView};
use crate::cli::query::load_config;
use crate::cli::GatewaysArgs;
use crate::dispatch::Dispatcher;
use crate::gateway::Gateway;
use serde_json::json;

/// Handle `querygate gateways`
pub async fn handle_gateways(args: &GatewaysArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let dispatcher = Dispatcher::from_config(&config)?;

    let mut views = Vec::new();
    for gateway in dispatcher.gateways() {
        let mut view = GatewayView::from(gateway);
        if args.check {
            view.check = Some(check(gateway, &dispatcher).await);
        }
        views.push(view);
    }

    if args.json {
        Ok(format_json(&json!({ "gateways": views }))?)
    } else {
        Ok(format_gateways_table(&views))
    }
}

/// Probe one gateway under the dispatcher's call timeout.
async fn check(gateway: &Gateway, dispatcher: &Dispatcher) -> CheckView {
    let outcome = match dispatcher.call_timeout() {
        Some(limit) => tokio::time::timeout(limit, gateway.probe())
            .await
            .unwrap_or(Err(crate::gateway::GatewayError::Timeout(limit))),
        None => gateway.probe().await,
    };

    match outcome {
        Ok(report) => CheckView::Ok(report),
        Err(e) => CheckView::Failed {
            kind: e.kind().to_string(),
            error: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_reports_unconfigured_gateway() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[gateways.vehicle]\ncommand = [\"querygate-missing-backend\"]\n\n[gateways.tax]\ncommand = []",
        )
        .unwrap();

        let out = handle_gateways(&GatewaysArgs {
            check: true,
            json: true,
            config: temp.path().to_path_buf(),
        })
        .await
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        let vehicle = &json["gateways"][0];
        assert_eq!(vehicle["configured"], true);
        assert_eq!(vehicle["check"]["status"], "failed");
        assert_eq!(vehicle["check"]["kind"], "connectivity");

        let tax = &json["gateways"][1];
        assert_eq!(tax["name"], "tax-data");
        assert_eq!(tax["configured"], false);
        assert_eq!(tax["check"]["kind"], "not_configured");
    }
}
