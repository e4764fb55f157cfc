//! Credit policy constants and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable constants of the credit formula.
///
/// ```text
/// base        = base_credits + difficulty * credits_per_difficulty
/// factor      = (uniqueness_offset + uniqueness) / 100
/// provisional = clamp(round(base * factor), min_credits, max_credits)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreditPolicy {
    pub base_credits: f64,
    pub credits_per_difficulty: f64,
    pub uniqueness_offset: f64,
    pub min_credits: u32,
    pub max_credits: u32,
    /// Provisional credits when no difficulty score is available.
    pub fallback_credits: u32,
    /// Accepted difficulty range; values outside are clamped.
    pub min_difficulty: u32,
    pub max_difficulty: u32,
}

impl CreditPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, min_credits: u32, max_credits: u32) -> Self {
        self.min_credits = min_credits;
        self.max_credits = max_credits;
        self
    }

    pub fn with_fallback(mut self, fallback_credits: u32) -> Self {
        self.fallback_credits = fallback_credits;
        self
    }

    pub fn with_slope(mut self, base_credits: f64, credits_per_difficulty: f64) -> Self {
        self.base_credits = base_credits;
        self.credits_per_difficulty = credits_per_difficulty;
        self
    }

    pub fn validate(&self) -> Result<(), CreditError> {
        for (name, value) in [
            ("base_credits", self.base_credits),
            ("credits_per_difficulty", self.credits_per_difficulty),
            ("uniqueness_offset", self.uniqueness_offset),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CreditError::InvalidPolicy(format!(
                    "{name} must be a finite, non-negative number"
                )));
            }
        }
        if self.min_credits > self.max_credits {
            return Err(CreditError::InvalidPolicy(
                "min_credits must not exceed max_credits".into(),
            ));
        }
        if !(self.min_credits..=self.max_credits).contains(&self.fallback_credits) {
            return Err(CreditError::InvalidPolicy(
                "fallback_credits must lie within [min_credits, max_credits]".into(),
            ));
        }
        if self.min_difficulty > self.max_difficulty {
            return Err(CreditError::InvalidPolicy(
                "min_difficulty must not exceed max_difficulty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            base_credits: 50.0,
            credits_per_difficulty: 4.5,
            uniqueness_offset: 50.0,
            min_credits: 50,
            max_credits: 500,
            fallback_credits: 50,
            min_difficulty: 1,
            max_difficulty: 100,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CreditError {
    #[error("invalid credit policy: {0}")]
    InvalidPolicy(String),
}
