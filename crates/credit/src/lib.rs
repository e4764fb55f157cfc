//! # VidCred Credit Scoring
//!
//! Fuses the delegated difficulty and uniqueness scores with the
//! fingerprint-level [`DuplicateVerdict`] into a bounded credit award.
//!
//! - Non-duplicates always land in `[min_credits, max_credits]`.
//! - A duplicate of the uploader's own video earns nothing.
//! - A duplicate of someone else's video keeps `1 - similarity/100` of the
//!   provisional award, so credits shrink to zero as similarity reaches 100.
//! - A missing difficulty never fails scoring; the policy's fallback applies
//!   and the award is flagged.
//!
//! ```
//! use credit::{CreditPolicy, CreditScorer};
//! use matcher::DuplicateVerdict;
//!
//! let scorer = CreditScorer::new(CreditPolicy::default()).unwrap();
//! let award = scorer.score(Some(50), Some(50), &DuplicateVerdict::unique());
//! assert_eq!(award.credits, 275);
//! ```

pub mod config;

use matcher::DuplicateVerdict;
use serde::{Deserialize, Serialize};

pub use crate::config::{CreditError, CreditPolicy};

/// Which duplicate rule, if any, changed the provisional award.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreditAdjustment {
    #[default]
    None,
    SameOwnerDuplicate,
    CrossOwnerDuplicate,
}

/// Outcome of credit scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditAward {
    /// Award before duplicate penalties.
    pub provisional: u32,
    /// Final award.
    pub credits: u32,
    /// Set when no usable difficulty score was available.
    pub fallback: bool,
    pub adjustment: CreditAdjustment,
    /// Human-readable explanation of any fallback or penalty.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreditScorer {
    policy: CreditPolicy,
}

impl CreditScorer {
    pub fn new(policy: CreditPolicy) -> Result<Self, CreditError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &CreditPolicy {
        &self.policy
    }

    /// Award before duplicate penalties, or `None` without a difficulty.
    pub fn provisional(&self, difficulty: Option<u32>, uniqueness: Option<u32>) -> Option<u32> {
        let p = &self.policy;
        let d = difficulty?.clamp(p.min_difficulty, p.max_difficulty);
        let u = uniqueness.unwrap_or(0).min(100);

        let base = p.base_credits + f64::from(d) * p.credits_per_difficulty;
        let factor = (p.uniqueness_offset + f64::from(u)) / 100.0;
        let raw = (base * factor).round();

        Some(raw.clamp(f64::from(p.min_credits), f64::from(p.max_credits)) as u32)
    }

    /// Score one upload.
    pub fn score(
        &self,
        difficulty: Option<u32>,
        uniqueness: Option<u32>,
        verdict: &DuplicateVerdict,
    ) -> CreditAward {
        let (provisional, fallback) = match self.provisional(difficulty, uniqueness) {
            Some(value) => (value, false),
            None => {
                tracing::warn!(
                    fallback_credits = self.policy.fallback_credits,
                    "difficulty unavailable; using fallback credits"
                );
                (self.policy.fallback_credits, true)
            }
        };
        let fallback_note = fallback.then(|| {
            format!(
                "Difficulty score unavailable; awarded the default {} credits.",
                self.policy.fallback_credits
            )
        });

        if !verdict.is_duplicate {
            return CreditAward {
                provisional,
                credits: provisional,
                fallback,
                adjustment: CreditAdjustment::None,
                message: fallback_note,
            };
        }

        let (credits, adjustment, penalty) = if verdict.same_owner_as_match {
            (
                0,
                CreditAdjustment::SameOwnerDuplicate,
                "You have already uploaded this video. No credits awarded.".to_string(),
            )
        } else {
            let keep = (1.0 - verdict.similarity / 100.0).max(0.0);
            let credits = (f64::from(provisional) * keep).round().max(0.0) as u32;
            (
                credits,
                CreditAdjustment::CrossOwnerDuplicate,
                format!(
                    "Video is {:.2}% similar to another user's upload; credits reduced from {provisional} to {credits}.",
                    verdict.similarity
                ),
            )
        };

        tracing::info!(provisional, credits, ?adjustment, "duplicate penalty applied");

        let message = match fallback_note {
            Some(note) => format!("{penalty} {note}"),
            None => penalty,
        };
        CreditAward {
            provisional,
            credits,
            fallback,
            adjustment,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duplicate(similarity: f64, same_owner: bool) -> DuplicateVerdict {
        DuplicateVerdict {
            is_duplicate: true,
            same_owner_as_match: same_owner,
            similarity,
            matched_owner: Some("alice".into()),
            comparable: true,
        }
    }

    fn scorer() -> CreditScorer {
        CreditScorer::default()
    }

    #[test]
    fn midpoint_scores_275() {
        let award = scorer().score(Some(50), Some(50), &DuplicateVerdict::unique());
        assert_eq!(award.provisional, 275);
        assert_eq!(award.credits, 275);
        assert!(!award.fallback);
        assert_eq!(award.adjustment, CreditAdjustment::None);
        assert!(award.message.is_none());
    }

    #[test]
    fn top_scores_clamp_to_500() {
        let award = scorer().score(Some(100), Some(100), &DuplicateVerdict::unique());
        assert_eq!(award.credits, 500);
    }

    #[test]
    fn lowest_scores_clamp_to_50() {
        let award = scorer().score(Some(1), Some(0), &DuplicateVerdict::unique());
        // (50 + 4.5) * 0.5 = 27.25 before clamping.
        assert_eq!(award.credits, 50);
    }

    #[test]
    fn cross_owner_duplicate_keeps_residual_share() {
        let award = scorer().score(Some(50), Some(50), &duplicate(97.0, false));
        assert_eq!(award.provisional, 275);
        assert_eq!(award.credits, 8);
        assert_eq!(award.adjustment, CreditAdjustment::CrossOwnerDuplicate);
        assert!(award.message.unwrap().contains("97.00%"));
    }

    #[test]
    fn same_owner_duplicate_earns_nothing() {
        for (d, u) in [(1, 0), (50, 50), (100, 100)] {
            let award = scorer().score(Some(d), Some(u), &duplicate(99.0, true));
            assert_eq!(award.credits, 0);
            assert_eq!(award.adjustment, CreditAdjustment::SameOwnerDuplicate);
            assert!(award.message.is_some());
        }
    }

    #[test]
    fn cross_owner_credits_fall_as_similarity_rises() {
        let mut last = u32::MAX;
        for tenth in 951..=1000 {
            let sim = f64::from(tenth) / 10.0;
            let credits = scorer().score(Some(80), Some(70), &duplicate(sim, false)).credits;
            assert!(credits <= last, "sim={sim} credits={credits} last={last}");
            last = credits;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn missing_difficulty_falls_back() {
        let award = scorer().score(None, Some(90), &DuplicateVerdict::unique());
        assert_eq!(award.credits, 50);
        assert!(award.fallback);
        assert!(award.message.unwrap().contains("default 50"));
    }

    #[test]
    fn fallback_still_takes_duplicate_penalty() {
        let award = scorer().score(None, None, &duplicate(98.0, false));
        assert!(award.fallback);
        assert_eq!(award.credits, 1);
    }

    #[test]
    fn missing_uniqueness_means_no_bonus() {
        let without = scorer().score(Some(50), None, &DuplicateVerdict::unique());
        let zero = scorer().score(Some(50), Some(0), &DuplicateVerdict::unique());
        assert_eq!(without.credits, zero.credits);
        assert_eq!(without.credits, 138);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let high = scorer().score(Some(1_000), Some(1_000), &DuplicateVerdict::unique());
        assert_eq!(high.credits, 500);
        let zero = scorer().provisional(Some(0), Some(50));
        assert_eq!(zero, scorer().provisional(Some(1), Some(50)));
    }

    #[test]
    fn non_duplicates_stay_within_bounds() {
        for d in [1u32, 10, 33, 50, 77, 100] {
            for u in [0u32, 25, 50, 75, 100] {
                let credits = scorer().score(Some(d), Some(u), &DuplicateVerdict::unique()).credits;
                assert!((50..=500).contains(&credits), "d={d} u={u} credits={credits}");
            }
        }
    }

    #[test]
    fn custom_policy_changes_mapping() {
        let policy = CreditPolicy::new().with_slope(100.0, 9.0).with_bounds(0, 2_000).with_fallback(0);
        let award = CreditScorer::new(policy)
            .unwrap()
            .score(Some(100), Some(50), &DuplicateVerdict::unique());
        assert_eq!(award.credits, 1_000);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        assert!(CreditScorer::new(CreditPolicy::new().with_bounds(10, 5)).is_err());
    }
}
