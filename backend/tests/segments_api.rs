use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use cycle_segments::{
    AppState,
    client::{ClientConfig, JourneyClient},
    create_router,
    models::{ApiError, SegmentsResponse},
};
use hyper::StatusCode;
use serde_json::{Value, json};
use tower::ServiceExt;

const SAMPLE_JOURNEY: &str = include_str!("../data/sample_journey.json");

fn test_app(base_url: &str) -> axum::Router {
    let client = JourneyClient::new(ClientConfig {
        api_key: "test-key".into(),
        base_url: base_url.into(),
    })
    .expect("client");
    let state = AppState {
        client: Arc::new(client),
    };
    create_router(state)
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn segments_endpoint_returns_table() {
    let app = test_app("http://127.0.0.1:9");
    let journey: Value = serde_json::from_str(SAMPLE_JOURNEY).unwrap();
    let payload = json!({
        "response": journey,
        "options": {"smoothing": {"enabled": true}}
    });

    let response = app.oneshot(post_json("/api/segments", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: SegmentsResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.row_count, 4);
    assert!(!body.gpx_base64.is_empty());

    let features = body.geojson["features"].as_array().unwrap();
    assert_eq!(features.len(), 4);
    assert_eq!(features[1]["properties"]["name"], "Bishopgate Street");
    assert!(features[1]["properties"]["gradient_smooth"].is_f64());
    assert_eq!(
        body.geojson["crs"]["properties"]["name"],
        "urn:ogc:def:crs:EPSG::4326"
    );
}

#[tokio::test]
async fn segments_endpoint_rejects_unknown_column() {
    let app = test_app("http://127.0.0.1:9");
    let journey: Value = serde_json::from_str(SAMPLE_JOURNEY).unwrap();
    let payload = json!({
        "response": journey,
        "options": {"table": {"cols": ["name", "gradient_segmnet"]}}
    });

    let response = app.oneshot(post_json("/api/segments", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: ApiError = serde_json::from_slice(&bytes).unwrap();
    assert!(body.message.contains("gradient_segmnet"));
}

#[tokio::test]
async fn segments_endpoint_rejects_payload_without_markers() {
    let app = test_app("http://127.0.0.1:9");
    let payload = json!({"response": {"error": "Invalid key"}});

    let response = app.oneshot(post_json("/api/segments", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn journey_endpoint_reports_unreachable_upstream() {
    let app = test_app("http://127.0.0.1:9");
    let payload = json!({
        "from": {"lat": 53.7958, "lon": -1.5492},
        "to": {"lat": 53.7982, "lon": -1.5440},
        "plan": "quietest"
    });

    let response = app.oneshot(post_json("/api/journey", &payload)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
