//! Configuration and error types for frame sampling.
//!
//! Sampling itself is a pure function of `(total_frames, sample_count)`; the
//! remaining knobs only describe where the decoder binaries live and where
//! request-scoped working directories are created.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the frame sampler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerConfig {
    /// Number of evenly spaced frames to sample (K).
    ///
    /// Fingerprints are only comparable when they were produced with the same
    /// sample count.
    pub sample_count: usize,
    /// Parent directory for request-scoped working areas. `None` uses the
    /// system temporary directory.
    #[serde(default)]
    pub work_root: Option<PathBuf>,
    /// `ffmpeg` executable used to decode frames.
    pub ffmpeg_bin: String,
    /// `ffprobe` executable used to count frames.
    pub ffprobe_bin: String,
}

impl SamplerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of frames to sample.
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Set the parent directory for working areas.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    /// Override the decoder binaries.
    pub fn with_binaries(mut self, ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        self.ffmpeg_bin = ffmpeg.into();
        self.ffprobe_bin = ffprobe.into();
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.sample_count == 0 {
            return Err(SamplerError::InvalidConfig(
                "sample_count must be >= 1".into(),
            ));
        }
        if self.ffmpeg_bin.trim().is_empty() || self.ffprobe_bin.trim().is_empty() {
            return Err(SamplerError::InvalidConfig(
                "ffmpeg_bin and ffprobe_bin must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_count: 10,
            work_root: None,
            ffmpeg_bin: "ffmpeg".into(),
            ffprobe_bin: "ffprobe".into(),
        }
    }
}

/// Errors returned while sampling frames from a video.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// The source could not be opened or has no decodable frames.
    #[error("unreadable video {path}: {reason}")]
    UnreadableVideo { path: String, reason: String },

    /// A decoder binary could not be launched.
    #[error("decoder tool `{tool}` unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("invalid sampler config: {0}")]
    InvalidConfig(String),

    /// Failure while preparing or clearing the working area.
    #[error("working area error: {0}")]
    WorkArea(#[from] std::io::Error),
}

impl SamplerError {
    pub(crate) fn unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SamplerError::UnreadableVideo {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure is attributable to the submitted video rather than
    /// to the host environment.
    pub fn is_unreadable_video(&self) -> bool {
        matches!(self, SamplerError::UnreadableVideo { .. })
    }
}
