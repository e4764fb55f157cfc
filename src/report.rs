//! Final per-upload report.

use analysis::TextAnalysis;
use credit::CreditAward;
use matcher::DuplicateVerdict;
use perceptual::VideoFingerprint;
use serde::{Deserialize, Serialize};

/// Everything the pipeline learned about one upload.
///
/// Produced once per request and handed back to the caller; the engine never
/// persists it. Recoverable failures (missing analysis fields, malformed
/// corpus input, credit fallback) are listed in `warnings`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub summary: String,
    pub topic: String,
    /// Difficulty in `1..=100`, `None` when the analyzer gave no usable score.
    pub difficulty: Option<u32>,
    /// Uniqueness in `0..=100`; 0 when the analyzer gave no usable score.
    pub uniqueness: u32,
    pub credits: u32,
    /// Hex form of the fingerprint, ready to be stored with the upload.
    pub fingerprint: String,
    pub similarity: f64,
    pub similarity_message: String,
    pub is_duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_owner: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    pub(crate) fn assemble(
        fingerprint: &VideoFingerprint,
        analysis: TextAnalysis,
        verdict: &DuplicateVerdict,
        award: &CreditAward,
        mut warnings: Vec<String>,
    ) -> Self {
        warnings.extend(analysis.notes);
        if award.fallback
            && let Some(message) = &award.message
            && !verdict.is_duplicate
        {
            warnings.push(message.clone());
        }

        Self {
            summary: analysis.summary,
            topic: analysis.topic,
            difficulty: analysis.difficulty,
            uniqueness: analysis.uniqueness.unwrap_or(0),
            credits: award.credits,
            fingerprint: fingerprint.to_hex(),
            similarity: verdict.similarity,
            similarity_message: similarity_message(verdict, award),
            is_duplicate: verdict.is_duplicate,
            matched_owner: verdict.matched_owner.clone(),
            warnings,
        }
    }

    /// Put caller-side warnings (e.g. corpus parsing) ahead of pipeline ones.
    pub fn with_leading_warnings<I>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut merged: Vec<String> = warnings.into_iter().collect();
        merged.append(&mut self.warnings);
        self.warnings = merged;
        self
    }
}

fn similarity_message(verdict: &DuplicateVerdict, award: &CreditAward) -> String {
    if verdict.is_duplicate {
        return award
            .message
            .clone()
            .unwrap_or_else(|| format!("Video is {:.2}% similar to an existing upload.", verdict.similarity));
    }
    if !verdict.comparable {
        return "Too few frames could be decoded to compare this video with existing uploads."
            .to_string();
    }
    if verdict.matched_owner.is_none() {
        return "No existing uploads to compare against.".to_string();
    }
    format!(
        "No duplicate found; closest existing upload is {:.2}% similar.",
        verdict.similarity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit::{CreditPolicy, CreditScorer};

    fn analysis(difficulty: Option<u32>) -> TextAnalysis {
        TextAnalysis {
            summary: "Intro to borrowing.".into(),
            topic: "rust".into(),
            difficulty,
            uniqueness: Some(50),
            notes: vec!["classify_topic unavailable".into()],
        }
    }

    fn fingerprint() -> VideoFingerprint {
        VideoFingerprint::new(64, vec![0xFF, 0x01])
    }

    fn verdict(is_duplicate: bool, same_owner: bool, similarity: f64) -> DuplicateVerdict {
        DuplicateVerdict {
            is_duplicate,
            same_owner_as_match: same_owner,
            similarity,
            matched_owner: Some("alice".into()),
            comparable: true,
        }
    }

    #[test]
    fn unique_upload_report() {
        let scorer = CreditScorer::new(CreditPolicy::default()).unwrap();
        let v = verdict(false, false, 40.0);
        let award = scorer.score(Some(50), Some(50), &v);
        let report = AnalysisReport::assemble(&fingerprint(), analysis(Some(50)), &v, &award, vec![]);

        assert_eq!(report.credits, 275);
        assert_eq!(report.uniqueness, 50);
        assert_eq!(report.fingerprint, "00000000000000ff0000000000000001");
        assert!(!report.is_duplicate);
        assert!(report.similarity_message.contains("40.00%"));
        assert_eq!(report.warnings, vec!["classify_topic unavailable".to_string()]);
    }

    #[test]
    fn cross_owner_duplicate_uses_penalty_message() {
        let scorer = CreditScorer::default();
        let v = verdict(true, false, 97.0);
        let award = scorer.score(Some(50), Some(50), &v);
        let report = AnalysisReport::assemble(&fingerprint(), analysis(Some(50)), &v, &award, vec![]);

        assert_eq!(report.credits, 8);
        assert_eq!(
            report.similarity_message,
            "Video is 97.00% similar to another user's upload; credits reduced from 275 to 8."
        );
        assert_eq!(report.matched_owner.as_deref(), Some("alice"));
    }

    #[test]
    fn fallback_credit_is_reported_as_warning() {
        let scorer = CreditScorer::default();
        let v = DuplicateVerdict::unique();
        let award = scorer.score(None, None, &v);
        let report = AnalysisReport::assemble(&fingerprint(), analysis(None), &v, &award, vec![]);

        assert_eq!(report.credits, 50);
        assert!(report.warnings.iter().any(|w| w.contains("default 50 credits")));
        assert_eq!(report.similarity_message, "No existing uploads to compare against.");
    }

    #[test]
    fn leading_warnings_come_first() {
        let scorer = CreditScorer::default();
        let v = DuplicateVerdict::unique();
        let award = scorer.score(Some(10), Some(10), &v);
        let report = AnalysisReport::assemble(&fingerprint(), analysis(Some(10)), &v, &award, vec![])
            .with_leading_warnings(["malformed corpus".to_string()]);
        assert_eq!(report.warnings[0], "malformed corpus");
        assert_eq!(report.warnings.len(), 2);
    }
}
