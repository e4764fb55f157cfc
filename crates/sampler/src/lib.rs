//! # VidCred Frame Sampler
//!
//! Extracts a fixed number of evenly spaced frames from a video so that the
//! perceptual layer can fingerprint it.
//!
//! ## Contract
//!
//! - Sample `i` of `K` sits at relative position `i / (K - 1)` of the decoded
//!   frame range, independent of duration or frame rate. Videos with fewer than
//!   `K` frames yield all of their frames.
//! - Sampling is a pure function of `(total_frames, K)`. No randomness.
//! - Frames are written into a [`WorkArea`] that is cleared before sampling and
//!   removed when the caller drops it.
//! - A source that cannot be opened, or has zero decodable frames, fails with
//!   [`SamplerError::UnreadableVideo`].
//!
//! ```no_run
//! use sampler::{FfmpegSource, FrameSampler, SamplerConfig, WorkArea};
//!
//! let cfg = SamplerConfig::default();
//! let sampler = FrameSampler::new(cfg.clone());
//! let work = WorkArea::new(None, "frames").unwrap();
//! let source = FfmpegSource::new("lecture.mp4", &cfg);
//! let frames = sampler.sample(&source, &work).unwrap();
//! assert!(frames.len() <= 10);
//! ```

pub mod config;
pub mod frame;
pub mod source;
pub mod workspace;

pub use crate::config::{SamplerConfig, SamplerError};
pub use crate::frame::{SampledFrame, SampledFrames};
pub use crate::source::{FfmpegSource, VideoSource};
pub use crate::workspace::WorkArea;

/// Frame indices for `k` evenly spaced samples over `total` frames.
///
/// Index `i` is `round(i * (total - 1) / (k - 1))`. When `total < k` every
/// frame index is returned.
pub fn sample_positions(total: u64, k: usize) -> Vec<u64> {
    if total == 0 || k == 0 {
        return Vec::new();
    }
    let k = k as u64;
    if total < k {
        return (0..total).collect();
    }
    if k == 1 {
        return vec![0];
    }
    let span = (total - 1) as u128;
    let steps = (k - 1) as u128;
    (0..k as u128)
        .map(|i| ((2 * i * span + steps) / (2 * steps)) as u64)
        .collect()
}

/// Samples frames from a [`VideoSource`] into a [`WorkArea`].
#[derive(Debug, Clone, Default)]
pub struct FrameSampler {
    cfg: SamplerConfig,
}

impl FrameSampler {
    pub fn new(cfg: SamplerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.cfg
    }

    /// Sample `sample_count` frames from `source` into `work`.
    pub fn sample(
        &self,
        source: &dyn VideoSource,
        work: &WorkArea,
    ) -> Result<SampledFrames, SamplerError> {
        self.cfg.validate()?;
        work.clear()?;

        let total = source.frame_count()?;
        if total == 0 {
            return Err(SamplerError::unreadable(
                source.describe(),
                "zero decodable frames",
            ));
        }

        let indices = sample_positions(total, self.cfg.sample_count);
        let mut paths = source.extract_frames(&indices, work.path())?;
        if paths.is_empty() {
            return Err(SamplerError::unreadable(
                source.describe(),
                "no frames could be decoded",
            ));
        }
        if paths.len() < indices.len() {
            tracing::warn!(
                video = %source.describe(),
                requested = indices.len(),
                decoded = paths.len(),
                "decoder produced fewer frames than requested"
            );
        }
        paths.truncate(indices.len());

        let denominator = total.saturating_sub(1).max(1) as f64;
        let frames: Vec<SampledFrame> = indices
            .iter()
            .zip(paths)
            .enumerate()
            .map(|(ordinal, (&frame_index, path))| SampledFrame {
                ordinal,
                frame_index,
                position: frame_index as f64 / denominator,
                path,
            })
            .collect();

        tracing::info!(
            video = %source.describe(),
            total_frames = total,
            sampled = frames.len(),
            requested = self.cfg.sample_count,
            "sampled video frames"
        );

        Ok(SampledFrames {
            total_frames: total,
            requested: self.cfg.sample_count,
            frames,
        })
    }
}
