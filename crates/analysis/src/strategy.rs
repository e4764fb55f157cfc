//! Pluggable text-analysis strategies and the fan-out that drives them.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Summary used when OCR produced no text.
pub const NO_TEXT_SUMMARY: &str = "No readable text found.";
/// Summary used when the summarize capability failed.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";
/// Topic used when there is no text or topic classification failed.
pub const UNKNOWN_TOPIC: &str = "Unknown";

/// The capability set every text-analysis strategy provides.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Short strategy name for logs and reports.
    fn name(&self) -> &'static str;

    /// Two-line summary of the text.
    async fn summarize(&self, text: &str) -> Result<String, AnalysisError>;

    /// Comma-separated list of the main topics.
    async fn classify_topic(&self, text: &str) -> Result<String, AnalysisError>;

    /// Learning difficulty in `1..=100`.
    async fn score_difficulty(&self, text: &str) -> Result<u32, AnalysisError>;

    /// Content uniqueness in `0..=100`.
    async fn score_uniqueness(&self, text: &str) -> Result<u32, AnalysisError>;
}

/// Combined output of the four capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextAnalysis {
    pub summary: String,
    pub topic: String,
    /// `None` when no usable difficulty came back.
    pub difficulty: Option<u32>,
    /// `None` when no usable uniqueness came back; scored as 0.
    pub uniqueness: Option<u32>,
    /// One entry per capability that fell back to its default.
    pub notes: Vec<String>,
}

impl TextAnalysis {
    /// Result for an upload without readable text.
    pub fn no_text() -> Self {
        Self {
            summary: NO_TEXT_SUMMARY.to_string(),
            topic: UNKNOWN_TOPIC.to_string(),
            difficulty: None,
            uniqueness: None,
            notes: Vec::new(),
        }
    }
}

async fn with_timeout<T, F>(
    capability: &'static str,
    budget: Duration,
    fut: F,
) -> Result<T, AnalysisError>
where
    F: Future<Output = Result<T, AnalysisError>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(AnalysisError::Timeout {
            capability,
            secs: budget.as_secs(),
        }),
    }
}

fn note_failure(notes: &mut Vec<String>, capability: &str, err: &AnalysisError, fallback: &str) {
    tracing::warn!(capability, error = %err, "analysis capability failed; using default");
    notes.push(format!("{capability} unavailable ({err}); {fallback}"));
}

/// Run all four capabilities over the joined text blocks.
///
/// Capabilities run concurrently, each bounded by `timeout`. A failed
/// capability falls back to its default and leaves a note. When every
/// capability fails the collaborator is considered unreachable and
/// [`AnalysisError::Unavailable`] is returned.
pub async fn analyze_text(
    analyzer: &dyn TextAnalyzer,
    blocks: &[String],
    timeout: Duration,
) -> Result<TextAnalysis, AnalysisError> {
    let text = blocks.join("\n");
    if text.trim().is_empty() {
        return Ok(TextAnalysis::no_text());
    }

    let (summary, topic, difficulty, uniqueness) = tokio::join!(
        with_timeout("summarize", timeout, analyzer.summarize(&text)),
        with_timeout("classify_topic", timeout, analyzer.classify_topic(&text)),
        with_timeout("score_difficulty", timeout, analyzer.score_difficulty(&text)),
        with_timeout("score_uniqueness", timeout, analyzer.score_uniqueness(&text)),
    );

    if summary.is_err() && topic.is_err() && difficulty.is_err() && uniqueness.is_err() {
        let reason = [
            summary.as_ref().err(),
            topic.as_ref().err(),
            difficulty.as_ref().err(),
            uniqueness.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
        return Err(AnalysisError::Unavailable(reason));
    }

    let mut notes = Vec::new();
    let summary = summary.unwrap_or_else(|e| {
        note_failure(&mut notes, "summarize", &e, "summary left blank");
        SUMMARY_UNAVAILABLE.to_string()
    });
    let topic = topic.unwrap_or_else(|e| {
        note_failure(&mut notes, "classify_topic", &e, "topic set to Unknown");
        UNKNOWN_TOPIC.to_string()
    });
    let difficulty = difficulty
        .map_err(|e| note_failure(&mut notes, "score_difficulty", &e, "default credits apply"))
        .ok();
    let uniqueness = uniqueness
        .map_err(|e| note_failure(&mut notes, "score_uniqueness", &e, "uniqueness scored as 0"))
        .ok();

    tracing::info!(
        analyzer = analyzer.name(),
        difficulty = ?difficulty,
        uniqueness = ?uniqueness,
        fallbacks = notes.len(),
        "text analysis complete"
    );

    Ok(TextAnalysis {
        summary,
        topic,
        difficulty,
        uniqueness,
        notes,
    })
}
