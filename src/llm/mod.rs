//! Language-model backend used by semantic analysis
//!
//! The analyzers only see the `LanguageModel` trait; `GeminiClient` is the
//! production implementation over Google's `generateContent` API.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a language-model backend
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

/// Result type for language-model operations
pub type LlmResult<T> = Result<T, LlmError>;

/// A text-generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Identifier used in logs
    fn model_name(&self) -> &str;

    /// Generates a completion for `prompt` applied to `context`
    async fn generate(&self, prompt: &str, context: &str) -> LlmResult<String>;
}
