//! Session boundary: one browsing context shared by a whole scan
//!
//! A `Session` hands out `PageHandle`s, navigates them, authenticates, and
//! records network observations for the lifetime of the scan. Page handles
//! are leases: dropping a handle releases its page, whether the task that
//! held it finished normally, returned an error, or panicked.

use crate::crawler::parser::extract_anchor_hrefs;
use crate::model::PerfMetrics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a session
///
/// Only failures from `init` and `create_page` are fatal to a scan.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to launch session: {0}")]
    Launch(String),

    #[error("Session has not been initialized")]
    NotInitialized,

    #[error("Session is closed")]
    Closed,

    #[error("Authentication setup failed: {0}")]
    Auth(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Kind of resource a page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Script,
    Stylesheet,
    Image,
    Media,
    Font,
    Other,
}

/// Something the session observed while loading pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A network response
    Response {
        /// The resource URL
        url: String,
        /// The page that loaded it
        page_url: String,
        status: u16,
        /// Time to first byte (milliseconds)
        ttfb_ms: u64,
        kind: ResourceKind,
    },

    /// A script error reported by the page
    ConsoleError { page_url: String, message: String },
}

/// A fully loaded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    pub html: String,
    pub perf: PerfMetrics,
    /// True when only the document loaded (fallback wait tier)
    pub content_only: bool,
}

/// Navigation state of a page handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Blank,
    Loaded(PageSnapshot),
    Failed { url: String, reason: String },
}

/// Counts live page handles; decremented when a handle is dropped
#[derive(Debug)]
struct PageLease {
    open: Arc<AtomicUsize>,
}

impl PageLease {
    fn acquire(open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self { open }
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A page within the shared session
#[derive(Debug)]
pub struct PageHandle {
    id: u64,
    blocked: HashSet<ResourceKind>,
    navigation: Navigation,
    _lease: PageLease,
}

impl PageHandle {
    /// Creates a handle that counts itself in `open_pages` until dropped
    ///
    /// `blocked` is the resource-blocking rule: kinds the page never loads.
    pub fn new(
        id: u64,
        blocked: impl IntoIterator<Item = ResourceKind>,
        open_pages: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            id,
            blocked: blocked.into_iter().collect(),
            navigation: Navigation::Blank,
            _lease: PageLease::acquire(open_pages),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// True if the resource-blocking rule aborts this kind
    pub fn is_blocked(&self, kind: ResourceKind) -> bool {
        self.blocked.contains(&kind)
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn set_loaded(&mut self, snapshot: PageSnapshot) {
        self.navigation = Navigation::Loaded(snapshot);
    }

    pub fn set_failed(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.navigation = Navigation::Failed {
            url: url.into(),
            reason: reason.into(),
        };
    }

    pub fn snapshot(&self) -> Option<&PageSnapshot> {
        match &self.navigation {
            Navigation::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// The loaded document, or an empty string
    pub fn html(&self) -> &str {
        self.snapshot().map_or("", |snapshot| snapshot.html.as_str())
    }

    /// URL of the current document, after redirects
    pub fn current_url(&self) -> Option<&str> {
        match &self.navigation {
            Navigation::Blank => None,
            Navigation::Loaded(snapshot) => Some(&snapshot.final_url),
            Navigation::Failed { url, .. } => Some(url),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.navigation, Navigation::Loaded(_))
    }
}

/// The browsing context a scan runs in
///
/// # Contract
///
/// - `init` is called once before any page is created; an error aborts the scan
/// - `visit_page` never fails; it records the outcome on the handle
/// - `perform_login` only acts for form-based authentication and tolerates
///   missing form fields with a warning
/// - `close` releases every resource and is called on every exit path
#[async_trait]
pub trait Session: Send + Sync {
    /// Launches the context and applies authentication state
    async fn init(&self) -> SessionResult<()>;

    /// Creates a new page with the resource-blocking rule installed
    async fn create_page(&self) -> SessionResult<PageHandle>;

    /// Navigates `page` to `url`
    async fn visit_page(&self, page: &mut PageHandle, url: &str);

    /// Logs in through a form, when the scan is configured for it
    async fn perform_login(&self, page: &mut PageHandle);

    /// All anchor href values of the loaded page, deduplicated
    fn extract_links(&self, page: &PageHandle) -> Vec<String> {
        extract_anchor_hrefs(page.html())
    }

    /// Takes every event recorded since the last call
    fn drain_events(&self) -> Vec<SessionEvent>;

    /// Releases all session resources
    async fn close(&self) -> SessionResult<()>;
}
