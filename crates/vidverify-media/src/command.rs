//! Running FFmpeg and FFprobe through their CLIs.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult, Tool};

/// Resolve a tool in `PATH`.
pub fn locate(tool: Tool) -> MediaResult<PathBuf> {
    which::which(tool.binary()).map_err(|_| MediaError::ToolNotFound(tool))
}

pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    locate(Tool::Ffmpeg)
}

pub fn check_ffprobe() -> MediaResult<PathBuf> {
    locate(Tool::Ffprobe)
}

/// Run `tool` to completion and return its stdout.
///
/// The child is killed if `timeout` expires. A non-zero exit becomes
/// `ToolFailed` carrying the trimmed stderr.
pub(crate) async fn run_tool(
    tool: Tool,
    args: &[String],
    timeout: Option<Duration>,
) -> MediaResult<Vec<u8>> {
    let binary = locate(tool)?;
    debug!("Running {} {}", tool.binary(), args.join(" "));

    let mut command = Command::new(binary);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| {
                warn!("{} timed out after {:?}, killing process", tool, limit);
                MediaError::Timeout {
                    tool,
                    secs: limit.as_secs(),
                }
            })??,
        None => command.output().await?,
    };

    if !output.status.success() {
        return Err(MediaError::tool_failed(
            tool,
            format!("exited with {}", output.status),
            &output.stderr,
            output.status.code(),
        ));
    }

    Ok(output.stdout)
}

/// One FFmpeg invocation writing a single output file.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    /// Joined into a single `-vf` chain
    filters: Vec<String>,
    output_args: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            filters: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Append a filter to the video filter chain.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Add an output option (placed after `-i`).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Decode exactly the frame with zero-based index `frame`.
    ///
    /// Frames are counted by the decoder, so the result does not depend on
    /// keyframe placement or container timestamps.
    pub fn select_frame(self, frame: u64) -> Self {
        self.filter(format!("select=eq(n\\,{})", frame))
            .output_arg("-vsync")
            .output_arg("0")
            .output_arg("-frames:v")
            .output_arg("1")
    }

    /// JPEG quality scale (2 is best, 31 worst).
    pub fn jpeg_quality(self, q: u8) -> Self {
        self.output_arg("-q:v").output_arg(q.clamp(2, 31).to_string())
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
        ];

        if !self.filters.is_empty() {
            args.push("-vf".to_string());
            args.push(self.filters.join(","));
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Runs FFmpeg commands with an optional per-command timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        run_tool(Tool::Ffmpeg, &cmd.build_args(), self.timeout).await?;
        Ok(())
    }
}
