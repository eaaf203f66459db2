//! FFmpeg CLI wrapper and image composition for evidence output.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - FFprobe frame rate and frame count
//! - Frame-accurate extraction of evidence stills
//! - The reference-versus-evidence comparison sheet

pub mod command;
pub mod comparison;
pub mod error;
pub mod frames;
pub mod probe;

pub use command::{check_ffmpeg, check_ffprobe, locate, FfmpegCommand, FfmpegRunner};
pub use comparison::{
    create_comparison_sheet, load_label_font, SheetLayout, SheetOptions, COMPARISON_FILE_NAME,
};
pub use error::{MediaError, MediaResult, Tool};
pub use frames::{evidence_file_name, extract_evidence_frames, FrameExtractor, DEFAULT_OUTPUT_DIR};
pub use probe::{probe_video, VideoInfo};
