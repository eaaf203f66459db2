//! Frame-accurate extraction of evidence stills.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use vidverify_models::{clamp_frame, EvidenceFrame, EvidenceTimestamp};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// Default directory for evidence stills.
pub const DEFAULT_OUTPUT_DIR: &str = "screenshots";

/// File name for the `index`-th (1-based) evidence frame.
///
/// `evidence_1_00-09_15_frame285.jpg` for timestamp `00:09.15` at frame 285.
pub fn evidence_file_name(index: usize, timestamp: &EvidenceTimestamp, frame: u64) -> String {
    format!("evidence_{}_{}_frame{}.jpg", index, timestamp.file_safe(), frame)
}

/// Extracts one still per evidence timestamp.
#[derive(Debug, Clone)]
pub struct FrameExtractor {
    output_dir: PathBuf,
    timeout_secs: u64,
    jpeg_quality: u8,
}

impl FrameExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeout_secs: 120,
            jpeg_quality: 2,
        }
    }

    /// Per-frame FFmpeg timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Extract the frames named by `timestamps`, in order.
    ///
    /// A timestamp that does not parse, or a single frame that FFmpeg fails
    /// to decode, is logged and skipped. Failing to probe the video is an
    /// error for the whole batch.
    pub async fn extract(
        &self,
        video_path: impl AsRef<Path>,
        timestamps: &[String],
    ) -> MediaResult<Vec<EvidenceFrame>> {
        if timestamps.is_empty() {
            return Ok(Vec::new());
        }

        let video_path = video_path.as_ref();
        tokio::fs::create_dir_all(&self.output_dir).await?;

        info!(
            "Extracting evidence frames for {} timestamps: {:?}",
            timestamps.len(),
            timestamps
        );

        let video = probe_video(video_path).await?;
        info!(
            "Video info: {:.2} FPS, {} total frames",
            video.fps, video.total_frames
        );

        let runner = FfmpegRunner::new().with_timeout(self.timeout_secs);
        let mut extracted = Vec::with_capacity(timestamps.len());

        for (i, raw) in timestamps.iter().enumerate() {
            let index = i + 1;
            let timestamp = match EvidenceTimestamp::parse(raw) {
                Ok(ts) => ts,
                Err(e) => {
                    warn!("Skipping evidence timestamp '{}': {}", raw, e);
                    continue;
                }
            };

            let frame_info = timestamp.to_frame_info(video.fps);
            let (frame, clamped) = clamp_frame(frame_info.exact_frame, video.total_frames);
            if clamped {
                warn!(
                    "Timestamp {} (frame {}) is past the end of the video, using last frame {}",
                    timestamp, frame_info.exact_frame, frame
                );
            }

            let path = self
                .output_dir
                .join(evidence_file_name(index, &timestamp, frame));

            let cmd = FfmpegCommand::new(video_path, &path)
                .select_frame(frame)
                .jpeg_quality(self.jpeg_quality)
                .log_level("error");

            match runner.run(&cmd).await {
                Ok(()) if path.exists() => {
                    info!(
                        "Extracted {} (timestamp {}, frame {})",
                        path.display(),
                        frame_info.timestamp_with_frame,
                        frame
                    );
                    extracted.push(EvidenceFrame {
                        index,
                        timestamp: timestamp.raw().to_string(),
                        frame,
                        clamped,
                        path,
                    });
                }
                Ok(()) => {
                    warn!(
                        "FFmpeg produced no image for timestamp {} (frame {})",
                        timestamp, frame
                    );
                }
                Err(e) => {
                    warn!(
                        "Failed to extract timestamp {} (frame {}): {}",
                        timestamp, frame, e
                    );
                }
            }
        }

        Ok(extracted)
    }
}

/// Extract evidence frames into `output_dir` with default settings.
pub async fn extract_evidence_frames(
    video_path: impl AsRef<Path>,
    timestamps: &[String],
    output_dir: impl Into<PathBuf>,
) -> MediaResult<Vec<EvidenceFrame>> {
    FrameExtractor::new(output_dir)
        .extract(video_path, timestamps)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_file_name() {
        let ts = EvidenceTimestamp::parse("00:09.15").unwrap();
        assert_eq!(
            evidence_file_name(1, &ts, 285),
            "evidence_1_00-09_15_frame285.jpg"
        );

        let ts = EvidenceTimestamp::parse("01:02:03").unwrap();
        assert_eq!(
            evidence_file_name(3, &ts, 93075),
            "evidence_3_01-02-03_frame93075.jpg"
        );
    }

    #[tokio::test]
    async fn test_empty_timestamps_do_no_work() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never-created");

        let frames = extract_evidence_frames("missing.mp4", &[], &out)
            .await
            .unwrap();

        assert!(frames.is_empty());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_missing_video_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract_evidence_frames(
            dir.path().join("missing.mp4"),
            &["00:01".to_string()],
            dir.path().join("shots"),
        )
        .await;

        assert!(matches!(
            result,
            Err(crate::error::MediaError::FileNotFound(_))
        ));
    }

    /// Renders a short synthetic clip and pulls frames out of it.
    #[tokio::test]
    #[ignore = "requires ffmpeg"]
    async fn test_extracts_requested_frames() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");

        let status = tokio::process::Command::new("ffmpeg")
            .args(["-y", "-v", "error", "-f", "lavfi", "-i", "testsrc=duration=2:size=160x120:rate=25"])
            .arg(&video)
            .status()
            .await
            .unwrap();
        assert!(status.success());

        let timestamps = vec![
            "00:00.10".to_string(),
            "not a time".to_string(),
            "00:30".to_string(),
        ];
        let frames = extract_evidence_frames(&video, &timestamps, dir.path().join("shots"))
            .await
            .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 1);
        assert_eq!(frames[0].frame, 10);
        assert!(!frames[0].clamped);
        assert_eq!(frames[1].index, 3);
        assert_eq!(frames[1].frame, 49);
        assert!(frames[1].clamped);
        assert!(frames.iter().all(|f| f.path.exists()));
    }
}
