//! The HTTP boundary driven over a real socket

use crate::support::{mount_page, offline_settings, page};
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use trust_lens::scan::ScanOptions;
use trust_lens::server::{serve, AppState};
use wiremock::MockServer;

async fn spawn_api(output: &TempDir) -> String {
    let mut settings = offline_settings();
    settings.output.directory = output.path().to_path_buf();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, AppState::new(settings, ScanOptions::default())));
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_scan_endpoint_returns_report_and_writes_markdown() {
    let site = MockServer::start().await;
    mount_page(&site, "/", page("Home", &["/about"])).await;
    mount_page(&site, "/about", page("About", &[])).await;

    let output = TempDir::new().unwrap();
    let api = spawn_api(&output).await;

    let response = reqwest::Client::new()
        .post(format!("{}/scan", api))
        .json(&serde_json::json!({ "url": site.uri(), "maxPages": 5, "maxDepth": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagesScanned"], 2);
    assert!(body["score"]["total"].as_u64().unwrap() <= 100);
    assert!(body["trustSummary"].is_string());
    assert!(body["knowledgeGraph"].is_array());

    let written: Vec<_> = std::fs::read_dir(output.path())
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("trust-report-"));
    assert!(written[0].ends_with(".md"));
}

#[tokio::test]
async fn test_api_scan_alias_rejects_bad_auth() {
    let output = TempDir::new().unwrap();
    let api = spawn_api(&output).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/scan", api))
        .json(&serde_json::json!({
            "url": "https://example.com",
            "auth": { "type": "basic", "loginUrl": "not a url", "username": "a", "password": "b" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
}
