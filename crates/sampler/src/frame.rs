//! Sampled frame descriptors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One frame written into the working area by the sampler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampledFrame {
    /// Position of this frame within the sample (0-based).
    pub ordinal: usize,
    /// Index of the decoded frame within the source video.
    pub frame_index: u64,
    /// Relative temporal position in `[0, 1]`.
    pub position: f64,
    /// Image file inside the working area.
    pub path: PathBuf,
}

/// Ordered result of a sampling run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampledFrames {
    /// Total decodable frames reported by the source.
    pub total_frames: u64,
    /// Sample count that was requested (K).
    pub requested: usize,
    pub frames: Vec<SampledFrame>,
}

impl SampledFrames {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `true` when exactly `requested` frames were produced. Incomplete samples
    /// yield fingerprints that are not comparable with full-length ones.
    pub fn is_complete(&self) -> bool {
        self.frames.len() == self.requested
    }

    /// Image paths in sample order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.frames.iter().map(|f| f.path.clone()).collect()
    }
}
