//! Configuration and error types for VidCred perceptual fingerprinting.
//!
//! This module defines the public configuration surface for the perceptual
//! layer. It is free of I/O so that hashing stays a pure function of
//! `(frame_pixels, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resampling filter used when shrinking a frame to the hash grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn as_image_filter(self) -> image::imageops::FilterType {
        use image::imageops::FilterType;
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Configuration for the per-frame perceptual hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version so stored fingerprints stay comparable.
    pub version: u32,
    /// Side length of the square brightness grid. Each frame hash has
    /// `hash_size * hash_size` bits. Must be even and within `2..=8`.
    pub hash_size: u32,
    /// Filter used to downscale frames to the grid.
    #[serde(default)]
    pub filter: ResizeFilter,
    /// Hash frames in parallel.
    #[serde(default)]
    pub use_parallel: bool,
}

impl PerceptualConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid side length. Typical values: 4-8.
    pub fn with_hash_size(mut self, hash_size: u32) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Number of bits in one frame hash.
    pub fn bit_width(&self) -> u32 {
        self.hash_size * self.hash_size
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if !(2..=8).contains(&self.hash_size) || self.hash_size % 2 != 0 {
            return Err(PerceptualError::InvalidHashSize {
                hash_size: self.hash_size,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            hash_size: 8,
            filter: ResizeFilter::default(),
            use_parallel: false,
        }
    }
}

/// Errors returned by the perceptual fingerprinting pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("no frames supplied for fingerprinting")]
    NoFrames,

    #[error("invalid config: hash_size must be an even value in 2..=8 (got {hash_size})")]
    InvalidHashSize { hash_size: u32 },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("failed to decode frame {path}: {reason}")]
    FrameDecode { path: String, reason: String },

    #[error("malformed fingerprint: {0}")]
    MalformedFingerprint(String),
}
