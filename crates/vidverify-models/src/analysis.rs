//! Structured fields extracted from the model's analysis text.
//!
//! The model answers in free-form prose followed by a short
//! machine-readable block. Labels may be English or Chinese, and the
//! separator may be an ASCII or a full-width colon. Nothing here fails:
//! fields the model omitted stay empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Overall verdict requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    SamePerson,
    DifferentPerson,
    Uncertain,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SamePerson => "same person",
            Self::DifferentPerson => "different person",
            Self::Uncertain => "uncertain",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "SAME_PERSON" | "是" => Some(Self::SamePerson),
            "DIFFERENT_PERSON" | "否" => Some(Self::DifferentPerson),
            "UNCERTAIN" | "不确定" => Some(Self::Uncertain),
            _ => None,
        }
    }
}

/// Grade of a 1-10 score where higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Strong,
    Moderate,
    Weak,
}

impl ScoreGrade {
    pub fn from_score(score: u32) -> Self {
        if score >= 8 {
            Self::Strong
        } else if score >= 6 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Strong => "✅",
            Self::Moderate => "⚠️",
            Self::Weak => "❌",
        }
    }
}

/// Spoofing risk level from a 1-10 risk score (higher is riskier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoofingRisk {
    Low,
    Medium,
    High,
}

impl SpoofingRisk {
    pub fn from_score(score: u32) -> Self {
        if score <= 3 {
            Self::Low
        } else if score <= 6 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low risk",
            Self::Medium => "medium risk",
            Self::High => "high risk",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Medium => "🟡",
            Self::High => "🔴",
        }
    }
}

/// Fields parsed out of an analysis response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisData {
    /// Evidence timestamps in the order the model listed them
    pub timestamps: Vec<String>,
    pub liveness_score: Option<u32>,
    pub biometric_score: Option<u32>,
    pub spoofing_risk_score: Option<u32>,
    pub confidence_score: Option<u32>,
    pub verdict: Option<Verdict>,
}

impl AnalysisData {
    /// Whether any of the three headline scores was reported.
    pub fn has_scores(&self) -> bool {
        self.liveness_score.is_some()
            || self.biometric_score.is_some()
            || self.spoofing_risk_score.is_some()
    }

    pub fn spoofing_risk(&self) -> Option<SpoofingRisk> {
        self.spoofing_risk_score.map(SpoofingRisk::from_score)
    }
}

// Each list is tried in order; the first pattern that matches wins.
static TIMESTAMP_LIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)证据时间戳[:：]\s*\[(.*?)\]").unwrap(),
        Regex::new(r"(?i)EVIDENCE_TIMESTAMPS[:：]\s*\[(.*?)\]").unwrap(),
    ]
});

static TIMESTAMP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}:\d{2}(?::\d{2})?(?:\.\d{1,2})?)").unwrap());

static LIVENESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)活体检测评分[:：]\s*(\d+)/10").unwrap(),
        Regex::new(r"(?i)LIVENESS_SCORE[:：]\s*(\d+)/10").unwrap(),
    ]
});

static BIOMETRIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)生物特征评分[:：]\s*(\d+)/10").unwrap(),
        Regex::new(r"(?i)BIOMETRIC_SCORE[:：]\s*(\d+)/10").unwrap(),
    ]
});

static SPOOFING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)伪造风险评分[:：]\s*(\d+)/10").unwrap(),
        Regex::new(r"(?i)SPOOFING_RISK_SCORE[:：]\s*(\d+)/10").unwrap(),
    ]
});

static CONFIDENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)整体置信度[:：]\s*(\d+)/10").unwrap(),
        Regex::new(r"(?i)OVERALL_CONFIDENCE[:：]\s*(\d+)/10").unwrap(),
    ]
});

static VERDICT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"判断结论[:：]\s*(不确定|是|否)").unwrap(),
        Regex::new(r"(?i)MATCH_VERDICT[:：]\s*(SAME_PERSON|DIFFERENT_PERSON|UNCERTAIN)").unwrap(),
    ]
});

/// Parse the structured fields out of a model response.
pub fn parse_analysis_response(text: &str) -> AnalysisData {
    let timestamps = first_capture(&TIMESTAMP_LIST_PATTERNS, text)
        .map(|list| {
            TIMESTAMP_PATTERN
                .find_iter(list)
                .map(|m| m.as_str().to_string())
                .collect()
        })
        .unwrap_or_default();

    AnalysisData {
        timestamps,
        liveness_score: first_score(&LIVENESS_PATTERNS, text),
        biometric_score: first_score(&BIOMETRIC_PATTERNS, text),
        spoofing_risk_score: first_score(&SPOOFING_PATTERNS, text),
        confidence_score: first_score(&CONFIDENCE_PATTERNS, text),
        verdict: first_capture(&VERDICT_PATTERNS, text).and_then(Verdict::from_label),
    }
}

fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn first_score(patterns: &[Regex], text: &str) -> Option<u32> {
    first_capture(patterns, text).and_then(|s| s.parse().ok())
}
