use perceptual::VideoFingerprint;
use rayon::prelude::*;

use crate::corpus::Corpus;
use crate::similarity::similarity;
use crate::types::{DuplicateVerdict, MatchConfig, MatchError, SimilarityResult};


/// Classifies a new fingerprint against a caller-supplied corpus.
#[derive(Debug, Clone)]
pub struct DuplicateClassifier {
    cfg: MatchConfig,
}

impl DuplicateClassifier {
    /// Construct a classifier from a validated config.
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Highest similarity against `corpus`.
    ///
    /// Entries are scored independently; on equal scores the earliest entry in
    /// corpus order wins.
    pub fn best_match(&self, fingerprint: &VideoFingerprint, corpus: &Corpus) -> SimilarityResult {
        if let Some(expected) = self.cfg.expected_len {
            if fingerprint.len() < expected {
                tracing::warn!(
                    hashes = fingerprint.len(),
                    expected,
                    "fingerprint too short to compare"
                );
                return SimilarityResult::none(false);
            }
        }
        if corpus.is_empty() {
            return SimilarityResult::none(true);
        }

        let entries = corpus.entries();
        let scores: Vec<f64> = if self.cfg.use_parallel {
            entries
                .par_iter()
                .map(|e| similarity(fingerprint, &e.fingerprint))
                .collect()
        } else {
            entries
                .iter()
                .map(|e| similarity(fingerprint, &e.fingerprint))
                .collect()
        };

        let (best_index, best_score) = scores.iter().copied().enumerate().fold(
            (0usize, f64::NEG_INFINITY),
            |(bi, bs), (i, s)| {
                tracing::debug!(entry = i, owner = %entries[i].owner, similarity = s, "scored corpus entry");
                if s > bs {
                    (i, s)
                } else {
                    (bi, bs)
                }
            },
        );

        SimilarityResult {
            score: best_score,
            matched_index: Some(best_index),
            matched_owner: Some(entries[best_index].owner.clone()),
            comparable: true,
        }
    }

    /// Duplicate verdict for `fingerprint` uploaded by `uploader`.
    ///
    /// A duplicate needs a best similarity strictly above the configured
    /// threshold. An unknown uploader never matches the entry's owner.
    pub fn classify(
        &self,
        fingerprint: &VideoFingerprint,
        corpus: &Corpus,
        uploader: Option<&str>,
    ) -> DuplicateVerdict {
        let best = self.best_match(fingerprint, corpus);
        let is_duplicate = best.score > self.cfg.duplicate_threshold;
        let same_owner_as_match = is_duplicate
            && matches!(
                (uploader, best.matched_owner.as_deref()),
                (Some(u), Some(o)) if u == o
            );

        tracing::info!(
            corpus_size = corpus.len(),
            similarity = best.score,
            is_duplicate,
            same_owner_as_match,
            "duplicate check complete"
        );

        DuplicateVerdict {
            is_duplicate,
            same_owner_as_match,
            similarity: best.score,
            matched_owner: best.matched_owner,
            comparable: best.comparable,
        }
    }
}

impl Default for DuplicateClassifier {
    fn default() -> Self {
        Self {
            cfg: MatchConfig::default(),
        }
    }
}
