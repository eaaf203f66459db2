//! Client for the Gemini Generative Language API.
//!
//! Covers what a video analysis run needs: resumable file upload, polling
//! uploaded files until they are processed, `generateContent` over those
//! files, and deleting them afterwards.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{GeminiClient, UploadProgress};
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use types::{FileState, GeminiFile, GenerateOutput};
