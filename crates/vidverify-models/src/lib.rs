//! Shared data models for vidverify.
//!
//! This crate provides:
//! - Frame-accurate evidence timestamps and frame math
//! - Structured fields parsed from the model's analysis text
//! - The serializable run report

pub mod analysis;
pub mod report;
pub mod timestamp;
pub mod utils;

// Re-export common types
pub use analysis::{parse_analysis_response, AnalysisData, ScoreGrade, SpoofingRisk, Verdict};
pub use report::{AnalysisReport, EvidenceFrame, RunId, TokenUsage};
pub use timestamp::{clamp_frame, EvidenceTimestamp, FrameInfo, TimestampError};
pub use utils::{format_file_size, format_thousands, FileInfo};
