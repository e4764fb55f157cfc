//! # VidCred Perceptual Fingerprinting
//!
//! Turns the frames picked by the sampler into a compact, similarity
//! preserving [`VideoFingerprint`].
//!
//! ## Contract
//!
//! - Each frame maps to one fixed-width average hash: the frame is reduced to
//!   a `hash_size x hash_size` luma grid and every cell is binarised against the
//!   grid mean.
//! - Frame hashes are concatenated **in sample order**.
//! - Near-identical frames (re-encoding, resizing) produce hashes a few bits
//!   apart; visually distinct frames produce hashes far apart.
//! - This crate never compares fingerprints; see the `matcher` crate.
//!
//! Invariant: for the same frames and the same [`PerceptualConfig`] the
//! fingerprint is bit identical, with or without `use_parallel`.
//!
//! ## Example Usage
//!
//! ```
//! use image::{DynamicImage, GrayImage, Luma};
//! use perceptual::{fingerprint_images, PerceptualConfig};
//!
//! let frames = vec![
//!     DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([0]))),
//!     DynamicImage::ImageLuma8(GrayImage::from_fn(32, 32, |x, _| Luma([(x * 8) as u8]))),
//! ];
//! let fp = fingerprint_images(&frames, &PerceptualConfig::default()).unwrap();
//!
//! assert_eq!(fp.len(), 2);
//! assert_eq!(fp.bit_width, 64);
//! assert_eq!(fp.to_hex().len(), 32);
//! ```

mod ahash;
pub mod config;
pub mod fingerprint;

use std::path::Path;

use image::DynamicImage;
use rayon::prelude::*;

pub use crate::config::{PerceptualConfig, PerceptualError, ResizeFilter};
pub use crate::fingerprint::{hamming_distance, VideoFingerprint};

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "luma_ahash_v1";

/// Hash a single decoded frame.
pub fn hash_frame(img: &DynamicImage, cfg: &PerceptualConfig) -> Result<u64, PerceptualError> {
    cfg.validate()?;
    Ok(ahash::average_hash(img, cfg))
}

/// Fingerprint already decoded frames, in the order given.
pub fn fingerprint_images(
    frames: &[DynamicImage],
    cfg: &PerceptualConfig,
) -> Result<VideoFingerprint, PerceptualError> {
    cfg.validate()?;
    if frames.is_empty() {
        return Err(PerceptualError::NoFrames);
    }

    let hashes: Vec<u64> = if cfg.use_parallel {
        frames
            .par_iter()
            .map(|img| ahash::average_hash(img, cfg))
            .collect()
    } else {
        frames
            .iter()
            .map(|img| ahash::average_hash(img, cfg))
            .collect()
    };

    Ok(VideoFingerprint::new(cfg.bit_width(), hashes))
}

/// Load frame images from disk and fingerprint them in the order given.
pub fn fingerprint_frames<P>(
    paths: &[P],
    cfg: &PerceptualConfig,
) -> Result<VideoFingerprint, PerceptualError>
where
    P: AsRef<Path> + Sync,
{
    cfg.validate()?;
    if paths.is_empty() {
        return Err(PerceptualError::NoFrames);
    }

    let hash_one = |path: &P| -> Result<u64, PerceptualError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| PerceptualError::FrameDecode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(ahash::average_hash(&img, cfg))
    };

    let hashes = if cfg.use_parallel {
        paths.par_iter().map(hash_one).collect::<Result<Vec<_>, _>>()?
    } else {
        paths.iter().map(hash_one).collect::<Result<Vec<_>, _>>()?
    };

    Ok(VideoFingerprint::new(cfg.bit_width(), hashes))
}
