use trust_lens::config::Settings;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A well-formed page linking to `links`
pub fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">Go to {}</a>"#, href, href))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>{title}</title>
  <meta name="description" content="{title} description">
  <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
  <h1>{title}</h1>
  <p>This page belongs to a small test site used to exercise the crawler end to end.</p>
  <nav>{anchors}</nav>
</body>
</html>"#
    )
}

/// Mounts an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Settings with the language model switched off
pub fn offline_settings() -> Settings {
    let mut settings = Settings::default();
    settings.llm.enabled = false;
    settings.cache.enabled = false;
    settings
}

/// `server.uri()` joined with `route`, in canonical form
pub fn page_url(server: &MockServer, route: &str) -> String {
    trust_lens::url::canonical_url(&format!("{}{}", server.uri(), route))
}
