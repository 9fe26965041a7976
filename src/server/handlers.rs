use super::AppState;
use crate::config::{AuthVariant, ScanConfig};
use crate::model::FinalReport;
use crate::output::{write_reports, ReportFormat};
use crate::scan::run_scan;
use crate::LensError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a scan request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub url: String,
    pub max_pages: Option<usize>,
    pub max_depth: Option<u32>,
    pub auth: Option<AuthVariant>,
    pub headless: Option<bool>,
}

impl ScanRequest {
    /// Request fields override the server's settings
    fn into_scan(self, state: &AppState) -> ScanConfig {
        let crawler = &state.settings.crawler;
        ScanConfig {
            start_url: self.url,
            max_pages: self.max_pages.unwrap_or(crawler.max_pages),
            max_depth: self.max_depth.unwrap_or(crawler.max_depth),
            auth: self.auth,
            headless: self.headless.unwrap_or(true),
        }
    }
}

/// Error body `{error, details}` with its status code
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    error: String,
    details: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &str, details: impl ToString) -> Self {
        Self {
            status,
            error: error.to_string(),
            details: details.to_string(),
        }
    }
}

impl From<LensError> for ApiError {
    fn from(err: LensError) -> Self {
        match err {
            LensError::Url(e) => Self::new(StatusCode::BAD_REQUEST, "Invalid URL", e),
            LensError::Config(e) => Self::new(StatusCode::BAD_REQUEST, "Invalid request", e),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Scan failed", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub(super) async fn scan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<FinalReport>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "Invalid request", e.body_text()))?;

    let scan = request.into_scan(&state);
    tracing::info!("Scan requested for {}", scan.start_url);

    let report = run_scan(&scan, &state.settings, &state.options).await?;

    if let Err(e) = write_reports(
        &report,
        &state.settings.output.directory,
        ReportFormat::Markdown,
    ) {
        tracing::warn!("Failed to write report file: {}", e);
    }

    Ok(Json(report))
}
