//! Human-readable run summary on stdout.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use vidverify_models::{
    format_thousands, AnalysisData, EvidenceFrame, FileInfo, ScoreGrade, TokenUsage,
};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_header(model: &str) {
    println!("🎬 Gemini video identity analysis ({})", model);
    println!("{}", rule());
}

pub fn print_upload_start(kind: &str, info: &FileInfo) {
    println!("\n📁 Uploading {}...", kind);
    println!("   File name: {}", info.name);
    println!("   File size: {}", info.size_str);
}

pub fn print_upload_done(kind: &str, elapsed: Duration, uri: &str) {
    println!("✅ {} uploaded in {:.1}s", capitalize(kind), elapsed.as_secs_f64());
    println!("   File URI: {}", uri);
}

pub fn print_upload_failed(kind: &str, error: &dyn Display) {
    println!("❌ {} upload failed: {}", capitalize(kind), error);
}

pub fn print_processing_start(kind: &str) {
    println!("\n⏳ Waiting for {} processing...", kind);
}

pub fn print_processing_done(elapsed: Duration) {
    println!("✅ Processing finished after {}s", elapsed.as_secs());
}

pub fn processing_message(waited: Duration) -> String {
    format!("Processing... (waited {}s)", waited.as_secs())
}

pub fn print_analysis_start() {
    println!("\n📝 Building analysis prompt...");
    println!("\n🤖 Starting AI analysis...");
    println!("   This can take several minutes.");
}

pub fn print_analysis_done(model: &str, analysis: Duration, total: Duration) {
    println!("\n✅ Analysis finished ({})", model);
    println!("   Analysis time: {}", format_minutes(analysis));
    println!("   Total time: {}", format_minutes(total));
}

pub fn print_token_usage(usage: &TokenUsage) {
    println!("\n📊 Token usage:");
    for line in token_usage_lines(usage) {
        println!("   {}", line);
    }
}

pub fn print_analysis_text(text: &str) {
    println!("\n{}", rule());
    println!("📊 Analysis result:");
    println!("{}", rule());
    println!("{}", text);
}

pub fn print_scores(data: &AnalysisData) {
    let lines = score_lines(data);
    if lines.is_empty() {
        return;
    }
    println!("\n📊 Scores:");
    for line in lines {
        println!("   {}", line);
    }
}

pub fn print_evidence(frames: &[EvidenceFrame], comparison: Option<&Path>) {
    if frames.is_empty() {
        return;
    }
    println!("\n📷 Evidence stills saved:");
    for frame in frames {
        print!("   🖼️  {} ({})", frame.path.display(), frame.label());
        if frame.clamped {
            print!(" [past end of video, last frame used]");
        }
        println!();
    }
    if let Some(path) = comparison {
        println!("   🖼️  {}", path.display());
    }
}

pub fn print_evidence_failed(error: &dyn Display) {
    println!("   ⚠️  Evidence extraction failed: {}", error);
}

pub fn print_cleanup_start() {
    println!("\n🧹 Deleting uploaded files...");
}

pub fn print_deleted(name: &str) {
    println!("   ✅ Deleted: {}", name);
}

pub fn print_delete_failed(name: &str, error: &dyn Display) {
    println!("   ⚠️  Delete failed: {} ({})", name, error);
}

pub fn print_kept_remote(names: &[&str]) {
    if names.is_empty() {
        return;
    }
    println!("\n📌 Keeping uploaded files: {}", names.join(", "));
}

pub fn print_report_written(path: &Path) {
    println!("\n📝 Report written: {}", path.display());
}

/// Minutes with one decimal, e.g. `3.5 min`.
pub fn format_minutes(elapsed: Duration) -> String {
    format!("{:.1} min", elapsed.as_secs_f64() / 60.0)
}

pub fn token_usage_lines(usage: &TokenUsage) -> Vec<String> {
    vec![
        format!("Input tokens: {}", format_thousands(usage.prompt_tokens)),
        format!("Output tokens: {}", format_thousands(usage.output_tokens)),
        format!("Total tokens: {}", format_thousands(usage.total_tokens)),
    ]
}

/// Score lines for whatever the model reported.
pub fn score_lines(data: &AnalysisData) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(score) = data.liveness_score {
        lines.push(format!(
            "{} Liveness score: {}/10",
            ScoreGrade::from_score(score).emoji(),
            score
        ));
    }
    if let Some(score) = data.biometric_score {
        lines.push(format!(
            "{} Biometric score: {}/10",
            ScoreGrade::from_score(score).emoji(),
            score
        ));
    }
    if let (Some(score), Some(risk)) = (data.spoofing_risk_score, data.spoofing_risk()) {
        lines.push(format!(
            "{} Spoofing risk score: {}/10 ({})",
            risk.emoji(),
            score,
            risk.as_str()
        ));
    }
    if let Some(score) = data.confidence_score {
        lines.push(format!("Overall confidence: {}/10", score));
    }
    if let Some(verdict) = data.verdict {
        lines.push(format!("Verdict: {}", verdict.as_str()));
    }

    lines
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
