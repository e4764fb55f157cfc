//! Remote generative-model strategy.
//!
//! Talks to a `generateContent` style JSON API: one prompt per capability,
//! plain-text answers, explicit numeric parsing.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::parse::{clean_text, parse_score};
use crate::retry::{execute_with_retry_async, RetryConfig};
use crate::strategy::TextAnalyzer;

const ANSWER_ONLY: &str = "Reply with only what is asked, with no extra commentary.";

/// Analyzer backed by a remote generative model.
///
/// The HTTP client is constructed once and owned by the analyzer; callers
/// share the analyzer itself (typically behind an `Arc`).
#[derive(Debug, Clone)]
pub struct GenerativeAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    retry: RetryConfig,
}

impl GenerativeAnalyzer {
    /// Build an analyzer with its own connection-pooled client.
    pub fn new(cfg: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| AnalysisError::InvalidConfig(format!("http client: {e}")))?;
        Self::with_client(client, cfg)
    }

    /// Build an analyzer around an existing client.
    pub fn with_client(client: reqwest::Client, cfg: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let api_key = cfg
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AnalysisError::InvalidConfig("api_key is required in generative mode".into())
            })?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint(),
            api_key,
            retry: cfg.retry,
        })
    }

    async fn send(&self, prompt: &str) -> Result<Value, String> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("request timeout: {e}")
                } else {
                    format!("connection error: {e}")
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {} {}", status.as_u16(), body.trim()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("invalid JSON response: {e}"))
    }

    async fn generate(&self, capability: &'static str, prompt: String) -> Result<String, AnalysisError> {
        let prompt = prompt.as_str();
        let outcome = execute_with_retry_async(&self.retry, move |attempt| async move {
            if attempt > 0 {
                tracing::debug!(capability, attempt, "retrying generative call");
            }
            self.send(prompt).await
        })
        .await;

        let attempts = outcome.attempts;
        let body = outcome.into_result().map_err(|e| {
            tracing::warn!(capability, attempts, error = %e, "generative call failed");
            if e.starts_with("invalid JSON") {
                AnalysisError::MalformedResponse(e)
            } else {
                AnalysisError::Http(e)
            }
        })?;
        extract_text(&body)
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(body: &Value) -> Result<String, AnalysisError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| AnalysisError::MalformedResponse("response has no candidates".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");
    let text = text.trim();
    if text.is_empty() {
        return Err(AnalysisError::MalformedResponse(
            "candidate contains no text".into(),
        ));
    }
    Ok(text.to_string())
}

#[async_trait]
impl TextAnalyzer for GenerativeAnalyzer {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let prompt = format!("{ANSWER_ONLY} Summarize the following text in 2 lines:\n{text}");
        Ok(clean_text(&self.generate("summarize", prompt).await?))
    }

    async fn classify_topic(&self, text: &str) -> Result<String, AnalysisError> {
        let prompt = format!(
            "{ANSWER_ONLY} Give a comma-separated list, without numbering, of the topics in this \
             text that matter most for subject knowledge:\n{text}"
        );
        let raw = self.generate("classify_topic", prompt).await?;
        Ok(clean_text(&raw).lines().collect::<Vec<_>>().join(", "))
    }

    async fn score_difficulty(&self, text: &str) -> Result<u32, AnalysisError> {
        let prompt = format!(
            "{ANSWER_ONLY} Answer with a single number. On a scale from 1 to 100, how difficult is \
             it for an average person to learn the course this text is teaching?\n{text}"
        );
        let raw = self.generate("score_difficulty", prompt).await?;
        parse_score(&raw, 1, 100).ok_or_else(|| {
            AnalysisError::MalformedResponse(format!("difficulty is not a number: {raw:?}"))
        })
    }

    async fn score_uniqueness(&self, text: &str) -> Result<u32, AnalysisError> {
        let prompt = format!(
            "{ANSWER_ONLY} Answer with a single number. On a scale from 0 to 100, how original is \
             this course material compared with typical material on the same topics?\n{text}"
        );
        let raw = self.generate("score_uniqueness", prompt).await?;
        parse_score(&raw, 0, 100).ok_or_else(|| {
            AnalysisError::MalformedResponse(format!("uniqueness is not a number: {raw:?}"))
        })
    }
}
