//! 纯引擎 HTTP 接口测试 (无需数据库)

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bigdecimal::BigDecimal;
use rfq_compare_rust::api::{engine_routes, EngineState};
use rfq_compare_rust::config::MatchingConfig;
use rfq_compare_rust::HeuristicEngine;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

fn setup_app() -> Router {
    engine_routes(EngineState {
        engine: Arc::new(HeuristicEngine),
        matching: MatchingConfig::default(),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn decimal(value: &Value) -> BigDecimal {
    match value {
        Value::String(s) => BigDecimal::from_str(s).unwrap(),
        other => BigDecimal::from_str(&other.to_string()).unwrap(),
    }
}

fn quote_line(id: i64, price: &str, freight: &str, lead: i64) -> Value {
    json!({
        "id": id,
        "line_number": 1,
        "description": "SKF 6205-2RS Bearing",
        "quantity": "10",
        "unit": "NOS",
        "unit_price": price,
        "gst_percent": "18",
        "freight": freight,
        "lead_time_days": lead,
        "matched_indent_line_id": 1
    })
}

fn comparison_request(price_b: &str) -> Value {
    json!({
        "indent_lines": [{
            "id": 1,
            "line_number": 1,
            "raw_description": "SKF 6205-2RS Bearing",
            "quantity": "10",
            "unit": "NOS"
        }],
        "vendors": [
            { "vendor_id": 1, "vendor_name": "Vendor A", "lines": [quote_line(11, "850", "0", 7)] },
            { "vendor_id": 2, "vendor_name": "Vendor B", "lines": [quote_line(21, price_b, "100", 10)] }
        ]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = setup_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_indent_parse_returns_normalized_drafts() {
    let request = post_json(
        "/api/engine/indent/parse",
        json!({ "text": "S.No Item Qty\nSKF 6205-2RS Bearing 10 nos\nAC motor 5HP 2 nos" }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    let drafts = body["data"].as_array().unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0]["line_number"], 1);
    assert_eq!(drafts[0]["unit"], "NOS");
    assert_eq!(drafts[0]["normalized_item"]["category"], "BEARINGS");
    assert_eq!(drafts[0]["normalized_item"]["confidence"], 0.85);
    assert_eq!(drafts[1]["normalized_item"]["category"], "MOTORS");
}

#[tokio::test]
async fn test_quote_parse_matches_against_given_indent_lines() {
    let request = post_json(
        "/api/engine/quote/parse",
        json!({
            "text": "SKF 6205-2RS Bearing 10 NOS Rs. 850/-\nFreight charges Rs. 500",
            "indent_lines": [{
                "id": 7,
                "line_number": 1,
                "raw_description": "SKF 6205-2RS Bearing 10 nos",
                "quantity": "10",
                "unit": "NOS"
            }]
        }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let lines = body["data"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(decimal(&lines[0]["unit_price"]), BigDecimal::from(850));
    assert_eq!(lines[0]["matched_indent_line_id"], 7);
    assert!(lines[1]["matched_indent_line_id"].is_null());
}

#[tokio::test]
async fn test_quote_parse_rejects_negative_threshold() {
    let request = post_json(
        "/api/engine/quote/parse",
        json!({ "text": "Bearing Rs. 100", "min_score": -0.5 }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_comparison_selects_lowest_cost_and_lead_time() {
    let request = post_json("/api/engine/comparison", comparison_request("800"));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let data = &body["data"];
    let row = &data["rows"][0];
    assert_eq!(decimal(&row["vendors"]["1"]["landed_cost"]), BigDecimal::from(10030));
    assert_eq!(decimal(&row["vendors"]["2"]["landed_cost"]), BigDecimal::from(9540));
    assert_eq!(row["lowest_cost_vendor"], 2);
    assert_eq!(row["lowest_lead_time_vendor"], 1);
    assert_eq!(data["selections"]["1"], 21);
    assert_eq!(data["summary"]["vendors_compared"], 2);

    let vendors = data["vendor_summary"].as_array().unwrap();
    assert_eq!(vendors.len(), 2);
    assert_eq!(vendors[0]["best_price_count"], 0);
    assert_eq!(vendors[1]["best_price_count"], 1);
    assert_eq!(decimal(&vendors[1]["total_landed_value"]), BigDecimal::from(9540));
    assert_eq!(data["recommendations"][0]["vendor_name"], "Vendor B");
    assert_eq!(data["recommendations"][0]["quote_line_id"], 21);
}

#[tokio::test]
async fn test_comparison_rejects_negative_price() {
    let request = post_json("/api/engine/comparison", comparison_request("-800"));
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_comparison_with_no_lines_is_empty() {
    let request = post_json(
        "/api/engine/comparison",
        json!({ "indent_lines": [], "vendors": [] }),
    );
    let response = setup_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["rows"], json!([]));
    assert_eq!(body["data"]["summary"]["total_lines"], 0);
}
