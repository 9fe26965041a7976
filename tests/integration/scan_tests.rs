//! Authentication, semantic analysis, and caching through complete scans

use crate::support::{mount_page, offline_settings, page};
use std::sync::Arc;
use tempfile::TempDir;
use trust_lens::config::{AuthVariant, LlmConfig, ScanConfig};
use trust_lens::llm::{GeminiClient, LanguageModel};
use trust_lens::model::{Category, Severity};
use trust_lens::scan::{run_scan, ScanOptions};
use trust_lens::storage::{ReportStore, SqliteReportStore};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGIN_FORM: &str = r#"<html lang="en"><head><title>Sign in</title></head><body>
<form action="/session" method="post">
  <input type="hidden" name="csrf" value="token-1">
  <label for="email">Email</label><input id="email" type="email" name="email">
  <label for="pw">Password</label><input id="pw" type="password" name="pw">
  <button type="submit">Sign in</button>
</form></body></html>"#;

#[tokio::test]
async fn test_basic_auth_logs_in_before_crawling() {
    let server = MockServer::start().await;
    mount_page(&server, "/login", LOGIN_FORM.to_string()).await;
    mount_page(&server, "/", page("Dashboard", &[])).await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_string_contains("email=alice%40example.com"))
        .and(body_string_contains("pw=hunter2"))
        .and(body_string_contains("csrf=token-1"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
        .expect(1)
        .mount(&server)
        .await;

    let scan = ScanConfig::new(server.uri())
        .with_limits(1, 0)
        .with_auth(AuthVariant::Basic {
            login_url: format!("{}/login", server.uri()),
            username: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        });

    let report = run_scan(&scan, &offline_settings(), &ScanOptions::default())
        .await
        .expect("scan failed");
    assert_eq!(report.pages_scanned, 1);
}

fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

fn gemini_options(server: &MockServer) -> ScanOptions {
    let config = LlmConfig {
        base_url: server.uri(),
        ..LlmConfig::default()
    };
    let client = GeminiClient::new("test-key", &config).expect("client");
    ScanOptions {
        store: None,
        model: Some(Arc::new(client) as Arc<dyn LanguageModel>),
    }
}

#[tokio::test]
async fn test_semantic_issues_from_gemini() {
    let site = MockServer::start().await;
    let html = page("Home", &[]).replace(
        "</nav>",
        "</nav><p>We guarantee 500% returns on every investment, no questions asked.</p>",
    );
    mount_page(&site, "/", html).await;

    let reply = r#"```json
{"issues":[{"category":"Content","severity":"High","description":"Unrealistic return promise","remediation":"Remove guaranteed return claims","userImpact":"Visitors may suspect fraud","exactQuote":"We guarantee 500% returns"}]}
```"#;
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-flash-latest:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(reply)))
        .expect(1)
        .mount(&gemini)
        .await;

    let mut settings = offline_settings();
    settings.llm.enabled = true;
    let scan = ScanConfig::new(site.uri()).with_limits(1, 0);
    let report = run_scan(&scan, &settings, &gemini_options(&gemini))
        .await
        .expect("scan failed");

    let issue = report
        .issues
        .iter()
        .find(|issue| issue.description == "Unrealistic return promise")
        .expect("semantic issue missing");
    assert_eq!(issue.category, Category::Content);
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.evidence.as_deref(), Some("AI Analysis"));
    assert_eq!(issue.snippet.as_deref(), Some("We guarantee 500% returns"));
    assert!(report
        .critical_issues
        .iter()
        .any(|critical| critical.description == "Unrealistic return promise"));
}

#[tokio::test]
async fn test_gemini_failure_does_not_fail_the_scan() {
    let site = MockServer::start().await;
    mount_page(&site, "/", page("Home", &[])).await;

    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&gemini)
        .await;

    let scan = ScanConfig::new(site.uri()).with_limits(1, 0);
    let report = run_scan(&scan, &offline_settings(), &gemini_options(&gemini))
        .await
        .expect("scan failed");

    assert_eq!(report.pages_scanned, 1);
    assert!(report
        .issues
        .iter()
        .all(|issue| issue.evidence.as_deref() != Some("AI Analysis")));
}

#[tokio::test]
async fn test_cached_report_is_served_without_crawling() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteReportStore::new(&dir.path().join("cache.db"), 24).unwrap());
    let options = ScanOptions {
        store: Some(store.clone() as Arc<dyn ReportStore>),
        model: None,
    };

    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &[])).await;
    let scan = ScanConfig::new(server.uri()).with_limits(1, 0);

    let first = run_scan(&scan, &offline_settings(), &options).await.unwrap();
    let requests_after_first = server.received_requests().await.unwrap().len();

    // Trailing slash variant hits the same cache entry
    let again = ScanConfig::new(format!("{}/", server.uri())).with_limits(1, 0);
    let second = run_scan(&again, &offline_settings(), &options).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(server.received_requests().await.unwrap().len(), requests_after_first);
    assert_eq!(store.report_count().unwrap(), 1);
}
