//! Offline keyword heuristics.
//!
//! Deterministic stand-in for the generative strategy: no network, no model,
//! same capability set.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::strategy::{TextAnalyzer, UNKNOWN_TOPIC};

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "because", "been", "before", "being", "between", "both", "cannot",
    "could", "does", "doing", "down", "during", "each", "every", "from", "further", "have",
    "having", "here", "into", "itself", "just", "more", "most", "much", "must", "only", "other",
    "over", "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "very", "were", "what",
    "when", "where", "which", "while", "will", "with", "would", "your", "you're", "yours",
];

const SUMMARY_SENTENCES: usize = 2;
const TOPIC_TERMS: usize = 3;
const LONG_WORD: usize = 8;

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| s.split_whitespace().count() >= 2)
}

/// Keyword-frequency analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn topic_terms(text: &str) -> Vec<String> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        for (pos, word) in words(text).into_iter().enumerate() {
            if word.chars().count() < 4
                || !word.chars().all(char::is_alphabetic)
                || STOPWORDS.contains(&word.as_str())
            {
                continue;
            }
            counts.entry(word).or_insert((0, pos)).0 += 1;
        }
        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        // Most frequent first; earlier first occurrence breaks ties.
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(TOPIC_TERMS)
            .map(|(word, _)| word)
            .collect()
    }
}

#[async_trait]
impl TextAnalyzer for KeywordAnalyzer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let lead: Vec<&str> = sentences(text).take(SUMMARY_SENTENCES).collect();
        if lead.is_empty() {
            return Ok(text.trim().lines().next().unwrap_or_default().to_string());
        }
        Ok(lead
            .iter()
            .map(|s| format!("{s}."))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn classify_topic(&self, text: &str) -> Result<String, AnalysisError> {
        let terms = Self::topic_terms(text);
        if terms.is_empty() {
            return Ok(UNKNOWN_TOPIC.to_string());
        }
        Ok(terms.join(", "))
    }

    async fn score_difficulty(&self, text: &str) -> Result<u32, AnalysisError> {
        let words = words(text);
        if words.is_empty() {
            return Err(AnalysisError::MalformedResponse(
                "no words to score".into(),
            ));
        }
        let n = words.len() as f64;
        let avg_len = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / n;
        let long_ratio = words
            .iter()
            .filter(|w| w.chars().count() >= LONG_WORD)
            .count() as f64
            / n;
        let score = ((avg_len - 3.0) * 15.0 + long_ratio * 60.0).round();
        Ok(score.clamp(1.0, 100.0) as u32)
    }

    async fn score_uniqueness(&self, text: &str) -> Result<u32, AnalysisError> {
        let words = words(text);
        if words.is_empty() {
            return Err(AnalysisError::MalformedResponse(
                "no words to score".into(),
            ));
        }
        let distinct = words.iter().collect::<std::collections::HashSet<_>>().len();
        let ratio = distinct as f64 / words.len() as f64;
        Ok((ratio * 100.0).round().clamp(0.0, 100.0) as u32)
    }
}
