//! Command line arguments and run configuration.

use std::path::PathBuf;

use clap::Parser;
use vidverify_gemini::GeminiConfig;
use vidverify_media::DEFAULT_OUTPUT_DIR;

use crate::error::PipelineResult;
use crate::prompt::PromptLanguage;

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Check whether the person in a reference photo appears live in a video.
#[derive(Debug, Clone, Parser)]
#[command(name = "vidverify", version, about)]
pub struct Args {
    /// Video file to analyze
    #[arg(long)]
    pub video: PathBuf,

    /// Reference photo of the person
    #[arg(long)]
    pub image: PathBuf,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Model to try when the previous one fails (repeatable)
    #[arg(long = "fallback-model", value_name = "MODEL")]
    pub fallback_models: Vec<String>,

    /// Directory for evidence stills, the comparison sheet and the report
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Language of the analysis prompt
    #[arg(long, value_enum, default_value_t = PromptLanguage::En)]
    pub prompt_language: PromptLanguage,

    /// Leave the uploaded files on the remote service
    #[arg(long)]
    pub keep_remote: bool,

    /// TrueType/OpenType font for comparison sheet labels
    #[arg(long, env = "VIDVERIFY_FONT")]
    pub font: Option<PathBuf>,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub video: PathBuf,
    pub image: PathBuf,
    /// Primary model first, then fallbacks, without duplicates
    pub models: Vec<String>,
    pub output_dir: PathBuf,
    pub prompt_language: PromptLanguage,
    pub keep_remote: bool,
    pub font: Option<PathBuf>,
    /// Per-frame FFmpeg timeout
    pub ffmpeg_timeout_secs: u64,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Combine parsed arguments with environment settings.
    pub fn from_args(args: Args) -> PipelineResult<Self> {
        let gemini = GeminiConfig::from_env()?;
        Ok(Self::with_gemini(args, gemini))
    }

    /// Build a config around an explicit client config.
    pub fn with_gemini(args: Args, gemini: GeminiConfig) -> Self {
        let mut models = vec![args.model];
        for model in args.fallback_models {
            if !models.contains(&model) {
                models.push(model);
            }
        }

        Self {
            video: args.video,
            image: args.image,
            models,
            output_dir: args.output_dir,
            prompt_language: args.prompt_language,
            keep_remote: args.keep_remote,
            font: args.font,
            ffmpeg_timeout_secs: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            gemini,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join("analysis_report.json")
    }
}
