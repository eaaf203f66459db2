//! Run report written at the end of a successful analysis.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::AnalysisData;

/// Unique identifier of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token accounting returned by the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// One still frame pulled out of the video as evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFrame {
    /// 1-based position in the model's timestamp list
    pub index: usize,
    /// Timestamp as written by the model
    pub timestamp: String,
    /// Zero-based frame index that was decoded
    pub frame: u64,
    /// Set when the timestamp pointed past the end of the video
    pub clamped: bool,
    pub path: PathBuf,
}

impl EvidenceFrame {
    /// Label drawn under the tile on the comparison sheet.
    pub fn label(&self) -> String {
        format!("Time: {} (frame {})", self.timestamp, self.frame)
    }
}

/// Full result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: RunId,
    pub model: String,
    pub video_path: PathBuf,
    pub reference_path: PathBuf,
    pub started_at: DateTime<Utc>,
    /// Seconds spent in the model call
    pub analysis_secs: f64,
    /// Seconds for the whole run, uploads included
    pub total_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    pub analysis: String,
    pub data: AnalysisData,
    pub screenshots: Vec<EvidenceFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_path: Option<PathBuf>,
}

impl AnalysisReport {
    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            run_id: RunId("run-1".to_string()),
            model: "gemini-2.5-pro".to_string(),
            video_path: PathBuf::from("live.mp4"),
            reference_path: PathBuf::from("ref.jpg"),
            started_at: Utc::now(),
            analysis_secs: 95.5,
            total_secs: 130.0,
            token_usage: None,
            analysis: "EVIDENCE_TIMESTAMPS: [00:09.15]".to_string(),
            data: AnalysisData {
                timestamps: vec!["00:09.15".to_string()],
                ..Default::default()
            },
            screenshots: vec![EvidenceFrame {
                index: 1,
                timestamp: "00:09.15".to_string(),
                frame: 285,
                clamped: false,
                path: PathBuf::from("screenshots/evidence_1_00-09_15_frame285.jpg"),
            }],
            comparison_path: None,
        }
    }

    #[test]
    fn test_evidence_label() {
        let report = sample_report();
        assert_eq!(report.screenshots[0].label(), "Time: 00:09.15 (frame 285)");
    }

    #[test]
    fn test_report_json_skips_empty_optionals() {
        let report = sample_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["run_id"], "run-1");
        assert!(json.get("token_usage").is_none());
        assert!(json.get("comparison_path").is_none());
        assert_eq!(json["data"]["timestamps"][0], "00:09.15");
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis_report.json");
        sample_report().write_json(&path).unwrap();

        let read: AnalysisReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.screenshots[0].frame, 285);
        assert_eq!(read.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
