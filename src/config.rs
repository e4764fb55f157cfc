//! YAML configuration file support for the VidCred pipeline.
//!
//! Every stage (sampler, perceptual, matcher, credit, analysis) can be
//! configured from a single YAML file. Missing sections fall back to the
//! stage defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "lecture uploads"
//!
//! sampler:
//!   sample_count: 10
//!   ffmpeg_bin: "ffmpeg"
//!   ffprobe_bin: "ffprobe"
//!
//! perceptual:
//!   version: 1
//!   hash_size: 8
//!   filter: "triangle"
//!   use_parallel: true
//!
//! matcher:
//!   duplicate_threshold: 95.0
//!   use_parallel: true
//!
//! credit:
//!   base_credits: 50.0
//!   credits_per_difficulty: 4.5
//!   min_credits: 50
//!   max_credits: 500
//!
//! analysis:
//!   mode: "generative"
//!   model: "gemini-2.0-flash"
//!   timeout_secs: 30
//!   max_text_blocks: 140
//!   require_analysis: false
//! ```
//!
//! The analysis API key is never read from YAML output; set it in the file
//! or through `VIDCRED_ANALYSIS_API_KEY`.

use std::fs;
use std::path::{Path, PathBuf};

use analysis::AnalysisConfig;
use credit::CreditPolicy;
use matcher::MatchConfig;
use perceptual::{PerceptualConfig, ResizeFilter};
use sampler::SamplerConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the analysis API key.
pub const API_KEY_ENV: &str = "VIDCRED_ANALYSIS_API_KEY";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub sampler: SamplerYamlConfig,

    #[serde(default)]
    pub perceptual: PerceptualYamlConfig,

    #[serde(default)]
    pub matcher: MatchYamlConfig,

    #[serde(default)]
    pub credit: CreditPolicy,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl PipelineConfig {
    /// Load a YAML configuration file and apply environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill secrets from the environment. `lookup` is usually `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.analysis.api_key = Some(key);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.sampler_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.perceptual_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.match_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.credit
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        // The API key may still arrive from the environment, so only the
        // shape of the analysis section is checked here.
        if self.analysis.timeout_secs == 0 || self.analysis.max_text_blocks == 0 {
            return Err(ConfigLoadError::Validation(
                "analysis.timeout_secs and analysis.max_text_blocks must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            sample_count: self.sampler.sample_count,
            work_root: self.sampler.work_root.clone(),
            ffmpeg_bin: self.sampler.ffmpeg_bin.clone(),
            ffprobe_bin: self.sampler.ffprobe_bin.clone(),
        }
    }

    pub fn perceptual_config(&self) -> PerceptualConfig {
        PerceptualConfig {
            version: self.perceptual.version,
            hash_size: self.perceptual.hash_size,
            filter: self.perceptual.filter,
            use_parallel: self.perceptual.use_parallel,
        }
    }

    /// Matcher config; fingerprints must carry one hash per sampled frame.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            version: self.matcher.version.clone(),
            duplicate_threshold: self.matcher.duplicate_threshold,
            expected_len: Some(self.sampler.sample_count),
            use_parallel: self.matcher.use_parallel,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            sampler: SamplerYamlConfig::default(),
            perceptual: PerceptualYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
            credit: CreditPolicy::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Sampler stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerYamlConfig {
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    #[serde(default)]
    pub work_root: Option<PathBuf>,

    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_bin: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe_bin: String,
}

impl Default for SamplerYamlConfig {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            work_root: None,
            ffmpeg_bin: default_ffmpeg(),
            ffprobe_bin: default_ffprobe(),
        }
    }
}

/// Perceptual stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerceptualYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_hash_size")]
    pub hash_size: u32,

    #[serde(default)]
    pub filter: ResizeFilter,

    #[serde(default = "true_value")]
    pub use_parallel: bool,
}

impl Default for PerceptualYamlConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            hash_size: default_hash_size(),
            filter: ResizeFilter::default(),
            use_parallel: true,
        }
    }
}

/// Matcher stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchYamlConfig {
    #[serde(default = "default_match_version")]
    pub version: String,

    #[serde(default = "default_threshold")]
    pub duplicate_threshold: f64,

    #[serde(default = "true_value")]
    pub use_parallel: bool,
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            version: default_match_version(),
            duplicate_threshold: default_threshold(),
            use_parallel: true,
        }
    }
}

fn default_version() -> u32 {
    1
}
fn default_sample_count() -> usize {
    10
}
fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}
fn default_ffprobe() -> String {
    "ffprobe".to_string()
}
fn default_hash_size() -> u32 {
    8
}
fn default_match_version() -> String {
    "v1".to_string()
}
fn default_threshold() -> f64 {
    95.0
}
fn true_value() -> bool {
    true
}
