//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Gemini error: {0}")]
    Gemini(#[from] vidverify_gemini::GeminiError),

    #[error("Media error: {0}")]
    Media(#[from] vidverify_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PipelineError::InputNotFound(PathBuf::from("clips/live.mp4"));
        assert_eq!(err.to_string(), "Input file not found: clips/live.mp4");

        let err: PipelineError = vidverify_gemini::GeminiError::Blocked("SAFETY".into()).into();
        assert_eq!(err.to_string(), "Gemini error: Prompt blocked: SAFETY");
    }
}
