//! Gemini client error types.

use thiserror::Error;

pub type GeminiResult<T> = Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("File {name} failed processing: {message}")]
    FileFailed { name: String, message: String },

    #[error("File {name} still processing after {secs} seconds")]
    ProcessingTimeout { name: String, secs: u64 },

    #[error("Prompt blocked: {0}")]
    Blocked(String),

    #[error("No content in Gemini response: {0}")]
    EmptyResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeminiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Network failures, rate limiting and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Network(_) => true,
            GeminiError::Api { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}
