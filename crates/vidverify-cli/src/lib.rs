//! Reference photo versus video analysis pipeline.
//!
//! Uploads both inputs to Gemini, asks for a liveness and identity
//! analysis, parses the structured block out of the answer and turns the
//! evidence timestamps into stills and a comparison sheet.

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod prompt;

pub use config::{AppConfig, Args, DEFAULT_MODEL};
pub use error::{PipelineError, PipelineResult};
pub use logging::{init_tracing, RunLogger};
pub use pipeline::Analyzer;
pub use prompt::{build_prompt, PromptLanguage};
