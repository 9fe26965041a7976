//! HTTP-backed session implementation
//!
//! This module provides a `Session` that loads pages with an HTTP client
//! instead of a rendering engine:
//! - A shared cookie jar carries injected cookies and login state
//! - Navigation waits in two tiers: the document plus its subresources within
//!   the quiescence budget, else the document alone within the navigation budget
//! - Subresources of blocked kinds (images, media, fonts) are never requested
//! - Every response is recorded as a `SessionEvent` for network analysis

use crate::config::{AuthVariant, CrawlerConfig, ScanConfig, UserAgentConfig};
use crate::crawler::parser::{extract_subresources, find_login_form, FormMethod, Subresource};
use crate::crawler::session::{
    PageHandle, PageSnapshot, ResourceKind, Session, SessionError, SessionEvent, SessionResult,
};
use crate::model::PerfMetrics;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::cookie::Jar;
use reqwest::{redirect::Policy, Client};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `jar` - Cookie store shared by every request of the session
/// * `timeout` - Overall per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    jar: Arc<Jar>,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .cookie_provider(jar)
        .gzip(true)
        .brotli(true)
        .build()
}

/// A document fetched over HTTP
struct FetchedDocument {
    final_url: String,
    status: u16,
    content_type: String,
    body: String,
    perf: PerfMetrics,
}

/// Session that loads pages with `reqwest`
pub struct HttpSession {
    auth: Option<AuthVariant>,
    start_url: String,
    headless: bool,
    crawler: CrawlerConfig,
    user_agent: UserAgentConfig,
    jar: Arc<Jar>,
    client: OnceLock<Client>,
    events: Mutex<Vec<SessionEvent>>,
    open_pages: Arc<AtomicUsize>,
    next_page_id: AtomicU64,
    closed: AtomicBool,
}

impl HttpSession {
    /// Creates an uninitialized session for one scan
    pub fn new(scan: &ScanConfig, crawler: CrawlerConfig, user_agent: UserAgentConfig) -> Self {
        Self {
            auth: scan.auth.clone(),
            start_url: scan.start_url.clone(),
            headless: scan.headless,
            crawler,
            user_agent,
            jar: Arc::new(Jar::default()),
            client: OnceLock::new(),
            events: Mutex::new(Vec::new()),
            open_pages: Arc::new(AtomicUsize::new(0)),
            next_page_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of page handles currently alive
    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    fn client(&self) -> SessionResult<&Client> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        self.client.get().ok_or(SessionError::NotInitialized)
    }

    fn record(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Injects cookies into the shared jar
    fn inject_cookies(&self, auth: &AuthVariant) -> SessionResult<()> {
        let AuthVariant::Cookies {
            cookies,
            local_storage,
        } = auth
        else {
            return Ok(());
        };

        let scheme = Url::parse(&self.start_url)
            .map(|url| url.scheme().to_string())
            .unwrap_or_else(|_| "https".to_string());

        for cookie in cookies {
            let host = cookie.domain.trim_start_matches('.');
            let origin = Url::parse(&format!("{}://{}{}", scheme, host, cookie.path))
                .map_err(|e| {
                    SessionError::Auth(format!("cookie '{}' has invalid domain: {}", cookie.name, e))
                })?;
            // IP hosts only take host-only cookies
            let header = if host.parse::<std::net::IpAddr>().is_ok() {
                format!("{}={}; Path={}", cookie.name, cookie.value, cookie.path)
            } else {
                format!(
                    "{}={}; Domain={}; Path={}",
                    cookie.name, cookie.value, host, cookie.path
                )
            };
            self.jar.add_cookie_str(&header, &origin);
        }
        tracing::info!("Added {} session cookies", cookies.len());

        if local_storage.as_ref().map_or(false, |entries| !entries.is_empty()) {
            tracing::warn!("localStorage entries are ignored: pages are not scripted by this session");
        }

        Ok(())
    }

    async fn fetch_document(&self, client: &Client, url: &str) -> Result<FetchedDocument, reqwest::Error> {
        let started = Instant::now();
        let response = client.get(url).send().await?;
        let ttfb_ms = started.elapsed().as_millis() as u64;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await?;
        let load_ms = started.elapsed().as_millis() as u64;

        self.record(SessionEvent::Response {
            url: final_url.clone(),
            page_url: final_url.clone(),
            status,
            ttfb_ms,
            kind: ResourceKind::Document,
        });

        Ok(FetchedDocument {
            final_url,
            status,
            content_type,
            body,
            perf: PerfMetrics { ttfb_ms, load_ms },
        })
    }

    async fn probe_subresource(&self, client: &Client, page_url: &str, resource: Subresource) {
        let started = Instant::now();
        match client.get(&resource.url).send().await {
            Ok(response) => {
                let ttfb_ms = started.elapsed().as_millis() as u64;
                self.record(SessionEvent::Response {
                    url: resource.url,
                    page_url: page_url.to_string(),
                    status: response.status().as_u16(),
                    ttfb_ms,
                    kind: resource.kind,
                });
            }
            Err(e) => {
                tracing::debug!("Subresource {} failed to load: {}", resource.url, e);
            }
        }
    }

    /// First wait tier: the document and every non-blocked subresource
    ///
    /// The document is parked in `loaded` as soon as it arrives, so a timeout
    /// while subresources are still pending keeps it.
    async fn load_settled(
        &self,
        client: &Client,
        blocked: &[ResourceKind],
        url: &str,
        loaded: &Mutex<Option<FetchedDocument>>,
    ) -> Result<(), reqwest::Error> {
        let document = self.fetch_document(client, url).await?;

        let resources: Vec<Subresource> = match Url::parse(&document.final_url) {
            Ok(base) => extract_subresources(&document.body, &base)
                .into_iter()
                .filter(|resource| !blocked.contains(&resource.kind))
                .collect(),
            Err(_) => Vec::new(),
        };
        let page_url = document.final_url.clone();
        *loaded.lock().unwrap_or_else(PoisonError::into_inner) = Some(document);

        join_all(
            resources
                .into_iter()
                .map(|resource| self.probe_subresource(client, &page_url, resource)),
        )
        .await;

        Ok(())
    }

    async fn submit_login(&self, page: &mut PageHandle, username: &str, password: &str) {
        let Some(page_url) = page.current_url().and_then(|url| Url::parse(url).ok()) else {
            tracing::warn!("Login page did not load; skipping login");
            return;
        };

        let Some(form) = find_login_form(page.html(), &page_url) else {
            tracing::warn!("Could not find login fields on {}", page_url);
            return;
        };

        let (Some(user_field), Some(pass_field)) = (&form.username_field, &form.password_field)
        else {
            tracing::warn!("Could not find login fields on {}", page_url);
            return;
        };

        let mut fields = form.hidden_fields.clone();
        fields.push((user_field.clone(), username.to_string()));
        fields.push((pass_field.clone(), password.to_string()));
        if let Some(submit) = &form.submit {
            fields.push(submit.clone());
        }
        if !form.has_submit_control {
            tracing::debug!("Login form has no submit control; submitting directly");
        }

        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!("Basic login failed: {}", e);
                return;
            }
        };

        let request = match form.method {
            FormMethod::Post => client.post(&form.action).form(&fields),
            FormMethod::Get => client.get(&form.action).query(&fields),
        };

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    tracing::warn!("Login form submission returned HTTP {}", status.as_u16());
                } else {
                    tracing::info!("Login form submitted (HTTP {})", status.as_u16());
                }
            }
            Err(e) => tracing::warn!("Basic login failed: {}", e),
        }
    }
}

#[async_trait]
impl Session for HttpSession {
    async fn init(&self) -> SessionResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        if self.client.get().is_some() {
            return Ok(());
        }

        let timeout = Duration::from_millis(self.crawler.navigation_timeout_ms);
        let client = build_http_client(&self.user_agent, self.jar.clone(), timeout)
            .map_err(|e| SessionError::Launch(e.to_string()))?;
        let _ = self.client.set(client);

        tracing::debug!(
            "Session ready (headless={}, blocked resources: {:?})",
            self.headless,
            self.crawler.block_resources
        );

        if let Some(auth) = &self.auth {
            match auth {
                AuthVariant::Basic { .. } => {
                    tracing::info!("Initializing authentication: basic (form login deferred)")
                }
                AuthVariant::Cookies { .. } => {
                    tracing::info!("Initializing authentication: cookies");
                    self.inject_cookies(auth)?;
                }
            }
        }

        Ok(())
    }

    async fn create_page(&self) -> SessionResult<PageHandle> {
        self.client()?;
        let id = self.next_page_id.fetch_add(1, Ordering::SeqCst);
        Ok(PageHandle::new(
            id,
            self.crawler.block_resources.iter().copied(),
            self.open_pages.clone(),
        ))
    }

    async fn visit_page(&self, page: &mut PageHandle, url: &str) {
        tracing::debug!("Navigating to: {}", url);

        let client = match self.client() {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", url, e);
                page.set_failed(url, e.to_string());
                return;
            }
        };

        let blocked: Vec<ResourceKind> = [
            ResourceKind::Document,
            ResourceKind::Script,
            ResourceKind::Stylesheet,
            ResourceKind::Image,
            ResourceKind::Media,
            ResourceKind::Font,
            ResourceKind::Other,
        ]
        .into_iter()
        .filter(|kind| page.is_blocked(*kind))
        .collect();

        let quiescence = Duration::from_millis(self.crawler.quiescence_timeout_ms);
        let navigation = Duration::from_millis(self.crawler.navigation_timeout_ms);

        let loaded = Mutex::new(None);
        let settled =
            tokio::time::timeout(quiescence, self.load_settled(client, &blocked, url, &loaded)).await;
        let parked = loaded.into_inner().unwrap_or_else(PoisonError::into_inner);

        let (outcome, content_only) = match (settled, parked) {
            (Ok(Err(e)), _) => (Err(e), false),
            (Ok(Ok(())), Some(document)) => (Ok(document), false),
            // Document arrived and was recorded; only subresources were pending
            (Err(_), Some(document)) => {
                tracing::debug!("Network idle timed out for {}, keeping the loaded document", url);
                (Ok(document), true)
            }
            (_, None) => {
                tracing::debug!("Network idle timed out for {}, falling back to document load", url);
                match tokio::time::timeout(navigation, self.fetch_document(client, url)).await {
                    Ok(result) => (result, true),
                    Err(_) => {
                        tracing::warn!("Failed to load {}: navigation timed out", url);
                        page.set_failed(url, "navigation timed out");
                        return;
                    }
                }
            }
        };

        match outcome {
            Ok(document) => {
                let is_html = document.content_type.is_empty()
                    || document.content_type.contains("text/html")
                    || document.content_type.contains("application/xhtml");
                if !is_html {
                    tracing::warn!(
                        "Failed to load {}: expected HTML, got {}",
                        url,
                        document.content_type
                    );
                    page.set_failed(url, format!("non-HTML content: {}", document.content_type));
                    return;
                }

                page.set_loaded(PageSnapshot {
                    final_url: document.final_url,
                    status: document.status,
                    html: document.body,
                    perf: document.perf,
                    content_only,
                });
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", url, e);
                page.set_failed(url, e.to_string());
            }
        }
    }

    async fn perform_login(&self, page: &mut PageHandle) {
        let Some(AuthVariant::Basic {
            login_url,
            username,
            password,
        }) = &self.auth
        else {
            return;
        };

        tracing::info!("Attempting basic login at {}", login_url);
        self.visit_page(page, login_url).await;
        self.submit_login(page, username, password).await;
    }

    fn drain_events(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    async fn close(&self) -> SessionResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let open = self.open_pages();
        if open > 0 {
            tracing::warn!("Closing session with {} pages still open", open);
        }
        tracing::debug!("Session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieSpec;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(start: &str, auth: Option<AuthVariant>) -> HttpSession {
        let mut scan = ScanConfig::new(start);
        scan.auth = auth;
        HttpSession::new(&scan, CrawlerConfig::default(), UserAgentConfig::default())
    }

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body, "text/html")
    }

    #[tokio::test]
    async fn test_create_page_requires_init() {
        let session = session_for("https://example.com", None);
        assert!(matches!(
            session.create_page().await,
            Err(SessionError::NotInitialized)
        ));

        session.init().await.unwrap();
        let page = session.create_page().await.unwrap();
        assert!(page.is_blocked(ResourceKind::Image));
        assert_eq!(session.open_pages(), 1);
        drop(page);
        assert_eq!(session.open_pages(), 0);

        session.close().await.unwrap();
        assert!(matches!(session.create_page().await, Err(SessionError::Closed)));
    }

    #[tokio::test]
    async fn test_visit_page_records_document_and_subresources() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(
                r#"<html><head><script src="/app.js"></script></head>
                <body><img src="/hero.png"><a href="/about">About</a></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/app.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hero.png"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server.uri(), None);
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.visit_page(&mut page, &format!("{}/", server.uri())).await;

        assert!(page.is_loaded());
        assert_eq!(session.extract_links(&page), vec!["/about"]);

        let events = session.drain_events();
        assert_eq!(events.len(), 2, "document plus script; image is blocked");
        assert!(events.iter().any(|event| matches!(
            event,
            SessionEvent::Response { status: 404, kind: ResourceKind::Script, .. }
        )));
        assert!(session.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_visit_page_never_fails() {
        let session = session_for("http://127.0.0.1:9", None);
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.visit_page(&mut page, "http://127.0.0.1:9/").await;
        assert!(!page.is_loaded());
    }

    #[tokio::test]
    async fn test_non_html_documents_fail_navigation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("%PDF", "application/pdf"),
            )
            .mount(&server)
            .await;

        let session = session_for(&server.uri(), None);
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session
            .visit_page(&mut page, &format!("{}/report.pdf", server.uri()))
            .await;
        assert!(!page.is_loaded());
    }

    #[tokio::test]
    async fn test_slow_subresources_fall_back_to_document_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(r#"<html><head><script src="/slow.js"></script></head><body>ok</body></html>"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow.js"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let scan = ScanConfig::new(server.uri());
        let crawler = CrawlerConfig {
            quiescence_timeout_ms: 300,
            navigation_timeout_ms: 5_000,
            ..CrawlerConfig::default()
        };
        let session = HttpSession::new(&scan, crawler, UserAgentConfig::default());
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.visit_page(&mut page, &format!("{}/", server.uri())).await;

        let snapshot = page.snapshot().expect("document should load");
        assert!(snapshot.content_only);
        assert!(snapshot.html.contains("ok"));
    }

    fn document_events(events: &[SessionEvent]) -> usize {
        events
            .iter()
            .filter(|event| matches!(event, SessionEvent::Response { kind: ResourceKind::Document, .. }))
            .count()
    }

    #[tokio::test]
    async fn test_fallback_keeps_the_recorded_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                html(r#"<html><head><script src="/slow.js"></script></head><body>ok</body></html>"#)
                    .set_delay(Duration::from_millis(1_100)),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow.js"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let scan = ScanConfig::new(server.uri());
        let crawler = CrawlerConfig {
            quiescence_timeout_ms: 1_500,
            navigation_timeout_ms: 5_000,
            ..CrawlerConfig::default()
        };
        let session = HttpSession::new(&scan, crawler, UserAgentConfig::default());
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.visit_page(&mut page, &format!("{}/", server.uri())).await;

        assert!(page.snapshot().expect("document should load").content_only);
        let events = session.drain_events();
        assert_eq!(document_events(&events), 1);

        let slow: Vec<_> = crate::analyzers::network_issues(&events)
            .into_iter()
            .filter(|issue| issue.description.starts_with("Slow Server Response"))
            .collect();
        assert_eq!(slow.len(), 1);
    }

    #[tokio::test]
    async fn test_slow_document_is_refetched_and_recorded_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                html("<html><body>late</body></html>").set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let scan = ScanConfig::new(server.uri());
        let crawler = CrawlerConfig {
            quiescence_timeout_ms: 200,
            navigation_timeout_ms: 5_000,
            ..CrawlerConfig::default()
        };
        let session = HttpSession::new(&scan, crawler, UserAgentConfig::default());
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.visit_page(&mut page, &format!("{}/", server.uri())).await;

        let snapshot = page.snapshot().expect("document should load");
        assert!(snapshot.content_only);
        assert!(snapshot.html.contains("late"));
        assert_eq!(document_events(&session.drain_events()), 1);
    }

    #[tokio::test]
    async fn test_cookie_auth_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/account"))
            .and(header("cookie", "sid=abc123"))
            .respond_with(html("<html><body>welcome back</body></html>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/account"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let auth = AuthVariant::Cookies {
            cookies: vec![CookieSpec {
                name: "sid".to_string(),
                value: "abc123".to_string(),
                domain: "127.0.0.1".to_string(),
                path: "/".to_string(),
            }],
            local_storage: None,
        };
        let session = session_for(&server.uri(), Some(auth));
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session
            .visit_page(&mut page, &format!("{}/account", server.uri()))
            .await;

        assert!(page.html().contains("welcome back"));
    }

    #[tokio::test]
    async fn test_form_login_submits_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(html(
                r#"<form action="/session" method="post">
                    <input type="hidden" name="csrf" value="t0k">
                    <input type="text" name="username">
                    <input type="password" name="password">
                    <button type="submit">Sign in</button>
                </form>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=s3cret"))
            .and(body_string_contains("csrf=t0k"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html("<html><body>home</body></html>"))
            .mount(&server)
            .await;

        let auth = AuthVariant::Basic {
            login_url: format!("{}/login", server.uri()),
            username: "alice".to_string(),
            password: "s3cret".to_string(),
        };
        let session = session_for(&server.uri(), Some(auth));
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.perform_login(&mut page).await;
    }

    #[tokio::test]
    async fn test_form_login_without_fields_is_a_noop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(html("<html><body>Login is temporarily disabled</body></html>"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let auth = AuthVariant::Basic {
            login_url: format!("{}/login", server.uri()),
            username: "alice".to_string(),
            password: "s3cret".to_string(),
        };
        let session = session_for(&server.uri(), Some(auth));
        session.init().await.unwrap();
        let mut page = session.create_page().await.unwrap();
        session.perform_login(&mut page).await;
        assert!(page.is_loaded());
    }
}
