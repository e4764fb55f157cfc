//! Retry with exponential backoff for delegated analysis calls.
//!
//! Only transient failures (timeouts, resets, 5xx, 429) are retried; anything
//! else fails on the first attempt.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Base delay between retries, doubled on every attempt.
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    /// Upper bound on a single delay.
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    /// Add up to 50% random jitter to every delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Outcome of a retried operation.
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    pub result: Result<T, String>,
    /// Number of attempts made (1 = no retries needed).
    pub attempts: u32,
    pub total_duration: Duration,
}

impl<T> RetryResult<T> {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, String> {
        self.result
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent.
pub async fn execute_with_retry_async<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let start = std::time::Instant::now();
    let mut last_error = String::from("no attempt made");

    for attempt in 0..=config.max_retries {
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                };
            }
            Err(error) => {
                let retryable = is_retryable_error(&error);
                last_error = error;
                if !retryable {
                    return RetryResult {
                        result: Err(last_error),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }
                if attempt < config.max_retries {
                    let delay = calculate_delay(config, attempt);
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %last_error, "retrying analysis call");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    RetryResult {
        result: Err(last_error),
        attempts: config.max_retries + 1,
        total_duration: start.elapsed(),
    }
}

fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(2_u64.saturating_pow(attempt));
    let delay = exponential.min(config.max_delay.as_millis() as u64);

    if config.jitter {
        let jitter = fastrand::u64(0..=delay / 2);
        Duration::from_millis(delay + jitter)
    } else {
        Duration::from_millis(delay)
    }
}

/// Whether an error string describes a transient failure.
pub fn is_retryable_error(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("reset")
        || error_lower.contains("temporarily")
        || error_lower.contains("unavailable")
        || error_lower.contains("503")
        || error_lower.contains("502")
        || error_lower.contains("504")
        || error_lower.contains("429")
        || error_lower.contains("408")
    {
        return true;
    }

    if error_lower.contains("400")
        || error_lower.contains("401")
        || error_lower.contains("403")
        || error_lower.contains("404")
        || error_lower.contains("invalid")
        || error_lower.contains("not found")
    {
        return false;
    }

    true
}
