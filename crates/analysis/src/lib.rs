//! # VidCred Text Collaborators
//!
//! Everything the pipeline delegates about *text*:
//!
//! - [`TextExtractor`]: OCR over sampled frames ([`TesseractExtractor`],
//!   [`NoopExtractor`]). Output is ordered, free of consecutive repeats and
//!   capped at `max_text_blocks`.
//! - [`TextAnalyzer`]: the capability set `summarize`, `classify_topic`,
//!   `score_difficulty`, `score_uniqueness`. [`KeywordAnalyzer`] works
//!   offline; [`GenerativeAnalyzer`] calls a remote model with retry.
//! - [`analyze_text`]: runs the four capabilities concurrently under a
//!   per-call timeout and substitutes documented defaults for anything that
//!   fails.
//!
//! Strategies are chosen by [`AnalysisMode`] and built once with
//! [`build_analyzer`]; nothing in this crate holds global client state.

pub mod config;
pub mod error;
pub mod generative;
pub mod keyword;
pub mod ocr;
pub mod parse;
pub mod retry;
mod serde_millis;
pub mod strategy;

use std::sync::Arc;

pub use crate::config::{AnalysisConfig, AnalysisMode};
pub use crate::error::AnalysisError;
pub use crate::generative::GenerativeAnalyzer;
pub use crate::keyword::KeywordAnalyzer;
pub use crate::ocr::{collect_blocks, NoopExtractor, TesseractExtractor, TextExtractor};
pub use crate::parse::parse_score;
pub use crate::retry::RetryConfig;
pub use crate::strategy::{
    analyze_text, TextAnalysis, TextAnalyzer, NO_TEXT_SUMMARY, SUMMARY_UNAVAILABLE, UNKNOWN_TOPIC,
};

/// Construct the analyzer selected by `cfg.mode`.
pub fn build_analyzer(cfg: &AnalysisConfig) -> Result<Arc<dyn TextAnalyzer>, AnalysisError> {
    cfg.validate()?;
    Ok(match cfg.mode {
        AnalysisMode::Keyword => Arc::new(KeywordAnalyzer::new()),
        AnalysisMode::Generative => Arc::new(GenerativeAnalyzer::new(cfg)?),
    })
}

/// Construct the OCR extractor described by `cfg`.
pub fn build_extractor(cfg: &AnalysisConfig) -> Arc<dyn TextExtractor> {
    if cfg.ocr_enabled {
        Arc::new(TesseractExtractor::new(
            cfg.tesseract_bin.clone(),
            cfg.max_text_blocks,
        ))
    } else {
        Arc::new(NoopExtractor)
    }
}
