//! Web API End-to-End Tests
//!
//! Health, fallback routing and the bundled client.

use axum_test::TestServer;
use cloud_vault::config::WebConfig;
use cloud_vault::file::{StorageDirectory, VaultService};
use cloud_vault::web::handlers::AppState;
use cloud_vault::web::router::create_router;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

async fn create_test_server(config: &WebConfig) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = StorageDirectory::open(temp_dir.path().join("uploads"))
        .await
        .expect("Failed to open storage");

    let app_state = Arc::new(AppState::new(VaultService::new(storage)));
    let server = TestServer::new(create_router(app_state, config)).expect("Failed to create test server");
    (server, temp_dir)
}

fn api_only_config() -> WebConfig {
    WebConfig {
        serve_static: false,
        ..WebConfig::default()
    }
}

#[tokio::test]
async fn test_health_check() {
    let (server, _temp_dir) = create_test_server(&api_only_config()).await;

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (server, _temp_dir) = create_test_server(&api_only_config()).await;

    let response = server.get("/no/such/page").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNHANDLED_ROUTE");
    assert_eq!(body["error"]["message"], "Not found");
}

#[tokio::test]
async fn test_openapi_document() {
    let (server, _temp_dir) = create_test_server(&api_only_config()).await;

    let response = server.get("/api/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/upload"].is_object());
    assert!(body["paths"]["/api/files"].is_object());
}

#[tokio::test]
async fn test_bundled_client_served() {
    let dist = TempDir::new().unwrap();
    std::fs::write(dist.path().join("index.html"), "<html>vault</html>").unwrap();
    std::fs::write(dist.path().join("app.js"), "console.log('vault')").unwrap();

    let config = WebConfig {
        serve_static: true,
        static_path: dist.path().to_string_lossy().into_owned(),
        ..WebConfig::default()
    };
    let (server, _temp_dir) = create_test_server(&config).await;

    let response = server.get("/app.js").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "console.log('vault')");

    // Client-side routes fall back to index.html
    let response = server.get("/some/client/route").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<html>vault</html>");

    // API routes still win over the bundle
    let response = server.get("/api/files").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["files"].is_array());
}

#[tokio::test]
async fn test_missing_bundle_falls_back_to_json_404() {
    let config = WebConfig {
        serve_static: true,
        static_path: "does/not/exist".to_string(),
        ..WebConfig::default()
    };
    let (server, _temp_dir) = create_test_server(&config).await;

    let response = server.get("/").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Not found");
}
