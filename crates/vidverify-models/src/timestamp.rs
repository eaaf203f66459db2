//! Frame-accurate evidence timestamps.
//!
//! Evidence timestamps come back from the model as `MM:SS`, `MM:SS.FF`,
//! `HH:MM:SS` or `HH:MM:SS.FF`. The `FF` part is a frame offset inside
//! that second, not a decimal fraction: `00:09.15` is frame 15 of second 9.

use thiserror::Error;

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Timestamp string is empty
    #[error("Timestamp cannot be empty")]
    Empty,
    /// Invalid numeric value for a component
    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
    /// Invalid timestamp format
    #[error("Invalid timestamp format '{0}'. Use MM:SS, MM:SS.FF, HH:MM:SS or HH:MM:SS.FF")]
    InvalidFormat(String),
}

/// A parsed evidence timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceTimestamp {
    /// The timestamp exactly as the model wrote it
    raw: String,
    /// The `MM:SS` / `HH:MM:SS` part before the frame offset
    time_part: String,
    /// Whole seconds from the start of the video
    total_seconds: u64,
    /// Frame offset within `total_seconds`
    frame_offset: u64,
}

/// Frame position derived from a timestamp and the video frame rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub total_seconds: u64,
    pub frame_offset: u64,
    /// Zero-based frame index in the video
    pub exact_frame: u64,
    /// Normalized `time.FF` form, frame offset always two digits
    pub timestamp_with_frame: String,
}

impl EvidenceTimestamp {
    /// Parse a frame-accurate timestamp.
    ///
    /// # Examples
    /// ```
    /// use vidverify_models::timestamp::EvidenceTimestamp;
    /// let ts = EvidenceTimestamp::parse("00:09.15").unwrap();
    /// assert_eq!(ts.total_seconds(), 9);
    /// assert_eq!(ts.frame_offset(), 15);
    /// ```
    pub fn parse(ts: &str) -> Result<Self, TimestampError> {
        let raw = ts.trim();
        if raw.is_empty() {
            return Err(TimestampError::Empty);
        }

        let (time_part, frame_offset) = match raw.split_once('.') {
            Some((time, frame)) => {
                let offset = frame
                    .parse::<u64>()
                    .map_err(|_| TimestampError::InvalidValue("frame", frame.to_string()))?;
                (time, offset)
            }
            None => (raw, 0),
        };

        let parts: Vec<&str> = time_part.split(':').collect();
        let components: &[(&'static str, u64)] = match parts.len() {
            2 => &[("minutes", 60), ("seconds", 1)],
            3 => &[("hours", 3600), ("minutes", 60), ("seconds", 1)],
            _ => return Err(TimestampError::InvalidFormat(raw.to_string())),
        };

        let mut total_seconds: u64 = 0;
        for (&(name, weight), value) in components.iter().zip(&parts) {
            total_seconds = parse_component(name, value)?
                .checked_mul(weight)
                .and_then(|secs| secs.checked_add(total_seconds))
                .ok_or_else(|| TimestampError::InvalidValue(name, value.to_string()))?;
        }

        Ok(Self {
            raw: raw.to_string(),
            time_part: time_part.to_string(),
            total_seconds,
            frame_offset,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn frame_offset(&self) -> u64 {
        self.frame_offset
    }

    /// Convert to an exact frame index for a video at `fps`.
    ///
    /// The base frame is truncated, then the frame offset is added on top.
    pub fn to_frame_info(&self, fps: f64) -> FrameInfo {
        let base_frame = (self.total_seconds as f64 * fps).floor().max(0.0) as u64;
        FrameInfo {
            total_seconds: self.total_seconds,
            frame_offset: self.frame_offset,
            exact_frame: base_frame.saturating_add(self.frame_offset),
            timestamp_with_frame: format!("{}.{:02}", self.time_part, self.frame_offset),
        }
    }

    /// Filename-safe form: `00:09.15` becomes `00-09_15`.
    pub fn file_safe(&self) -> String {
        self.raw.replace(':', "-").replace('.', "_")
    }
}

impl std::fmt::Display for EvidenceTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_component(name: &'static str, value: &str) -> Result<u64, TimestampError> {
    value
        .parse::<u64>()
        .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))
}

/// Clamp a frame index into a video with `total_frames` frames.
///
/// Returns the usable frame and whether clamping happened.
pub fn clamp_frame(exact_frame: u64, total_frames: u64) -> (u64, bool) {
    if total_frames > 0 && exact_frame >= total_frames {
        (total_frames - 1, true)
    } else {
        (exact_frame, false)
    }
}
