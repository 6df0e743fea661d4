//! Integration tests for the HTTP API.
//!
//! Requests are driven straight through the router with scripted
//! backends behind the dispatcher.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_test_app, scripted_dispatcher, unconfigured_dispatcher, Script, ScriptedConnector,
};
use serde_json::{json, Value};
use tower::Service;

async fn post_json(app: &mut axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn tax_app() -> axum::Router {
    let vehicle = ScriptedConnector::new(Script::rows(vec![json!({"make": "Tesla"})]));
    let tax = ScriptedConnector::new(Script::rows(vec![json!({"state": "TX", "rate": 6.25})]));
    create_test_app(scripted_dispatcher(&vehicle, &tax))
}

#[tokio::test]
async fn query_returns_envelope_with_rows() {
    let mut app = tax_app();

    let (status, body) = post_json(&mut app, "/api/query", json!({"query": "TX tax rate"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["source"], "tax");
    assert_eq!(body["query"], "TX tax rate");
    assert!(body["confidence"].as_f64().unwrap() >= 0.9);
    assert_eq!(body["data"][0]["state"], "TX");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn backend_failure_is_still_200_with_error_envelope() {
    let mut app = create_test_app(unconfigured_dispatcher());

    let (status, body) =
        post_json(&mut app, "/api/query", json!({"query": "Show California state tax data"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["source"], "tax");
    assert!(body["confidence"].as_f64().unwrap() > 0.5);
    assert!(body["reason"].as_str().unwrap().contains("tax/region"));
    assert!(body["error"].as_str().unwrap().contains("tax-data"));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn blank_query_is_bad_request() {
    let mut app = tax_app();

    let (status, body) = post_json(&mut app, "/api/query", json!({"query": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let mut app = tax_app();

    let (status, body) = post_json(&mut app, "/api/query", json!({"text": "tesla"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn classify_returns_breakdown_without_backend_call() {
    let vehicle = ScriptedConnector::new(Script::default());
    let tax = ScriptedConnector::new(Script::default());
    let mut app = create_test_app(scripted_dispatcher(&vehicle, &tax));

    let (status, body) =
        post_json(&mut app, "/api/classify", json!({"query": "Show me data"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "vehicle");
    assert_eq!(body["confidence"], 0.5);
    assert_eq!(body["breakdown"]["vehicle_score"], 0);
    assert_eq!(body["breakdown"]["tax_score"], 0);
    assert_eq!(vehicle.counters.opened() + tax.counters.opened(), 0);
}

#[tokio::test]
async fn classify_ignores_region_inside_words() {
    let mut app = tax_app();

    let (_, body) = post_json(&mut app, "/api/classify", json!({"query": "cats and dogs"})).await;

    assert_eq!(body["breakdown"]["region"], Value::Null);
    assert_eq!(body["breakdown"]["region_boost"], "none");
}

#[tokio::test]
async fn health_lists_gateways() {
    let mut app = create_test_app(unconfigured_dispatcher());

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ready"], false);
    assert!(body["started_at"].is_string());
    assert_eq!(body["gateways"][0]["name"], "vehicle-data");
    assert_eq!(body["gateways"][1]["source"], "tax");
    assert_eq!(body["gateways"][1]["configured"], false);
}

#[tokio::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let mut app = tax_app();

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let mut app = tax_app();

    let request = Request::builder()
        .uri("/unknown/path")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_route_rejects_get() {
    let mut app = tax_app();

    let request = Request::builder().uri("/api/query").body(Body::empty()).unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
