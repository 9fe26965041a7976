//! HTTP boundary
//!
//! Exposes scans over HTTP:
//! - `POST /scan` (also `POST /api/scan`) runs a scan and returns the report
//! - `GET /health` reports liveness

mod handlers;

pub use handlers::{ApiError, ScanRequest};

use crate::config::Settings;
use crate::scan::ScanOptions;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// State shared by every request
pub struct AppState {
    pub settings: Settings,
    pub options: ScanOptions,
}

impl AppState {
    pub fn new(settings: Settings, options: ScanOptions) -> Self {
        Self { settings, options }
    }
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", post(handlers::scan))
        .route("/api/scan", post(handlers::scan))
        .route("/health", get(handlers::health))
        .with_state(Arc::new(state))
}

/// Serves the API on an already-bound listener until the process stops
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}
