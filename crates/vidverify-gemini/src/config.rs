//! Gemini client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{GeminiError, GeminiResult};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,
    /// Base URL of the API, without a trailing slash
    pub base_url: String,
    /// Timeout for metadata and generateContent requests
    pub timeout: Duration,
    /// Timeout for a whole file upload
    pub upload_timeout: Duration,
    /// Delay between file state polls
    pub poll_interval: Duration,
    /// Maximum time to wait for a file to leave PROCESSING
    pub processing_timeout: Duration,
    /// Retries for idempotent requests
    pub max_retries: u32,
    /// Bytes read per upload chunk
    pub upload_chunk_size: usize,
}

impl GeminiConfig {
    /// Create a config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(600),
            upload_timeout: Duration::from_secs(3600),
            poll_interval: Duration::from_secs(1),
            processing_timeout: Duration::from_secs(900),
            max_retries: 2,
            upload_chunk_size: 256 * 1024,
        }
    }

    /// Create config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GeminiError::config("GEMINI_API_KEY not set"))?;

        let defaults = Self::new(api_key);

        Ok(Self {
            base_url: std::env::var("GEMINI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url.clone()),
            timeout: env_secs("GEMINI_TIMEOUT_SECS").unwrap_or(defaults.timeout),
            upload_timeout: env_secs("GEMINI_UPLOAD_TIMEOUT_SECS")
                .unwrap_or(defaults.upload_timeout),
            poll_interval: env_secs("GEMINI_POLL_INTERVAL_SECS")
                .unwrap_or(defaults.poll_interval),
            processing_timeout: env_secs("GEMINI_PROCESSING_TIMEOUT_SECS")
                .unwrap_or(defaults.processing_timeout),
            max_retries: std::env::var("GEMINI_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            ..defaults
        })
    }

    /// Point the client at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_processing_timeout(mut self, timeout: Duration) -> Self {
        self.processing_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("upload_timeout", &self.upload_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("processing_timeout", &self.processing_timeout)
            .field("max_retries", &self.max_retries)
            .field("upload_chunk_size", &self.upload_chunk_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = GeminiConfig::new("key").with_base_url("http://localhost:9000/");
        assert_eq!(config.base_url, "http://localhost:9000");
    }
}
