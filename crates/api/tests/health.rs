//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, FakeDeployTarget, FakeLlm};

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_test_app(tmp.path(), Arc::new(FakeLlm::default()), Arc::default());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["llm_configured"], true);
    assert_eq!(json["salesforce_configured"], false);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_test_app(tmp.path(), Arc::new(FakeLlm::default()), Arc::default());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_test_app(tmp.path(), Arc::new(FakeLlm::default()), Arc::default());
    let response = get(app, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );
    assert_eq!(request_id.unwrap().to_str().unwrap().len(), 36);
}

// ---------------------------------------------------------------------------
// Test: static files are served for unmatched paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn static_directory_is_served() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("public")).unwrap();
    std::fs::write(tmp.path().join("public/index.html"), "<h1>Upload</h1>").unwrap();

    let app = build_test_app(tmp.path(), Arc::new(FakeLlm::default()), Arc::default());
    let response = get(app, "/index.html").await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: GET /api/test-litellm relays the model reply
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_litellm_returns_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let llm = Arc::new(FakeLlm::default());
    let app = build_test_app(tmp.path(), llm.clone(), Arc::default());

    let response = get(app, "/api/test-litellm").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["response"], "Hello world");
    assert_eq!(llm.sent_contents(), vec!["Say hello world".to_string()]);
}

#[tokio::test]
async fn test_litellm_failure_returns_500() {
    let tmp = tempfile::tempdir().unwrap();
    let app = build_test_app(
        tmp.path(),
        Arc::new(FakeLlm::failing()),
        Arc::new(FakeDeployTarget::default()),
    );

    let response = get(app, "/api/test-litellm").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "LLM_ERROR");
    assert_eq!(json["error"], "Failed to connect to LiteLLM");
}
