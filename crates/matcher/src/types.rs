use perceptual::{PerceptualError, VideoFingerprint};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for duplicate classification.
///
/// `MatchConfig` is cheap to clone and serde-friendly so it can be embedded
/// in the pipeline YAML config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Configuration schema version for this match config.
    pub version: String,
    /// A video is a duplicate when its best similarity is strictly greater
    /// than this percentage.
    #[serde(default = "MatchConfig::default_duplicate_threshold")]
    pub duplicate_threshold: f64,
    /// Number of hashes a comparable fingerprint must carry (the sample
    /// count). Shorter fingerprints score 0 against everything.
    #[serde(default)]
    pub expected_len: Option<usize>,
    /// Score corpus entries on the rayon pool.
    #[serde(default = "MatchConfig::default_use_parallel")]
    pub use_parallel: bool,
}

impl MatchConfig {
    pub(crate) fn default_duplicate_threshold() -> f64 {
        95.0
    }

    pub(crate) fn default_use_parallel() -> bool {
        true
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.duplicate_threshold = threshold;
        self
    }

    pub fn with_expected_len(mut self, expected_len: usize) -> Self {
        self.expected_len = Some(expected_len);
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.version.trim().is_empty() {
            return Err(MatchError::InvalidConfig(
                "config.version must not be empty".into(),
            ));
        }
        if !self.duplicate_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.duplicate_threshold)
        {
            return Err(MatchError::InvalidConfig(
                "duplicate_threshold must be between 0.0 and 100.0".into(),
            ));
        }
        if self.expected_len == Some(0) {
            return Err(MatchError::InvalidConfig(
                "expected_len must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            duplicate_threshold: Self::default_duplicate_threshold(),
            expected_len: None,
            use_parallel: Self::default_use_parallel(),
        }
    }
}

/// One previously accepted video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorpusEntry {
    pub fingerprint: VideoFingerprint,
    pub owner: String,
}

impl CorpusEntry {
    pub fn new(fingerprint: VideoFingerprint, owner: impl Into<String>) -> Self {
        Self {
            fingerprint,
            owner: owner.into(),
        }
    }

    /// Build an entry from the hex text form of a fingerprint.
    pub fn from_hex(
        fingerprint: &str,
        owner: impl Into<String>,
        bit_width: u32,
    ) -> Result<Self, MatchError> {
        Ok(Self::new(
            VideoFingerprint::from_hex(fingerprint, bit_width)?,
            owner,
        ))
    }
}

/// Best similarity found against a corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResult {
    /// Highest similarity percentage, `0.0` for an empty corpus.
    pub score: f64,
    /// Position of the best entry in corpus order.
    pub matched_index: Option<usize>,
    /// Owner of the best entry.
    pub matched_owner: Option<String>,
    /// False when the new fingerprint was too short to compare at all.
    pub comparable: bool,
}

impl SimilarityResult {
    pub(crate) fn none(comparable: bool) -> Self {
        Self {
            score: 0.0,
            matched_index: None,
            matched_owner: None,
            comparable,
        }
    }
}

/// Duplicate decision for one upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DuplicateVerdict {
    pub is_duplicate: bool,
    /// Only meaningful when `is_duplicate` is set.
    pub same_owner_as_match: bool,
    pub similarity: f64,
    pub matched_owner: Option<String>,
    pub comparable: bool,
}

impl DuplicateVerdict {
    /// Verdict for an upload with nothing to compare against.
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            same_owner_as_match: false,
            similarity: 0.0,
            matched_owner: None,
            comparable: true,
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// A corpus fingerprint could not be decoded.
    #[error("corpus fingerprint error: {0}")]
    Fingerprint(#[from] PerceptualError),
}
