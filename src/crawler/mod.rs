//! Crawler module for page loading and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The session boundary and its HTTP-backed implementation
//! - HTML helpers for links, subresources, login forms, and page text
//! - The breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod frontier;
mod http_session;
pub mod parser;
mod session;

pub use coordinator::{Coordinator, CrawlLedger, CrawlState};
pub use frontier::{Frontier, QueuedUrl};
pub use http_session::{build_http_client, HttpSession};
pub use session::{
    Navigation, PageHandle, PageSnapshot, ResourceKind, Session, SessionError, SessionEvent,
    SessionResult,
};
