use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AnalysisError;
use crate::retry::RetryConfig;

/// Which text-analysis strategy backs the pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Offline heuristics; no network access.
    #[default]
    Keyword,
    /// Remote generative model over a `generateContent` style JSON API.
    Generative,
}

/// Runtime configuration for OCR and text analysis.
///
/// # Example
/// ```
/// use analysis::{AnalysisConfig, AnalysisMode};
///
/// let cfg = AnalysisConfig {
///     mode: AnalysisMode::Generative,
///     api_key: Some("test-key".into()),
///     timeout_secs: 10,
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// assert!(cfg.endpoint().ends_with("gemini-2.0-flash:generateContent"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    /// Base URL of the generative API.
    pub api_url: String,
    /// API key sent as `x-goog-api-key`. Required in generative mode.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model name appended to the base URL.
    pub model: String,
    /// Budget for each delegated call, retries included.
    pub timeout_secs: u64,
    /// Cap on distinct OCR text blocks passed to the analyzer.
    pub max_text_blocks: usize,
    /// Run OCR over sampled frames.
    pub ocr_enabled: bool,
    /// `tesseract` executable.
    pub tesseract_bin: String,
    pub retry: RetryConfig,
    /// Fail the whole request when every delegated call fails, instead of
    /// reporting defaults.
    pub require_analysis: bool,
}

impl AnalysisConfig {
    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.timeout_secs == 0 {
            return Err(AnalysisError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if self.max_text_blocks == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_text_blocks must be greater than zero".into(),
            ));
        }
        if self.ocr_enabled && self.tesseract_bin.trim().is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "tesseract_bin must not be empty when OCR is enabled".into(),
            ));
        }
        if self.mode == AnalysisMode::Generative {
            if self.api_url.trim().is_empty() || self.model.trim().is_empty() {
                return Err(AnalysisError::InvalidConfig(
                    "api_url and model are required in generative mode".into(),
                ));
            }
            if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                return Err(AnalysisError::InvalidConfig(
                    "api_key is required in generative mode".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Keyword,
            api_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            model: "gemini-2.0-flash".into(),
            timeout_secs: 30,
            max_text_blocks: 140,
            ocr_enabled: true,
            tesseract_bin: "tesseract".into(),
            retry: RetryConfig::default(),
            require_analysis: false,
        }
    }
}
