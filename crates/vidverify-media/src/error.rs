//! Media error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

/// External program a media operation shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl Tool {
    /// Executable name looked up in `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ffmpeg => "FFmpeg",
            Self::Ffprobe => "FFprobe",
        })
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(Tool),

    #[error("{tool} failed: {message}")]
    ToolFailed {
        tool: Tool,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: Tool, secs: u64 },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No video stream in input")]
    NoVideoStream,

    #[error("Cannot use font {}: {reason}", .path.display())]
    InvalidFont { path: PathBuf, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediaError {
    /// Build a `ToolFailed` error from raw process stderr.
    pub fn tool_failed(
        tool: Tool,
        message: impl Into<String>,
        stderr: &[u8],
        exit_code: Option<i32>,
    ) -> Self {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        Self::ToolFailed {
            tool,
            message: message.into(),
            stderr: (!stderr.is_empty()).then_some(stderr),
            exit_code,
        }
    }
}
