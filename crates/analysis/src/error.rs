use thiserror::Error;

/// Errors surfaced by the OCR and text-analysis collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Configuration is inconsistent (e.g. generative mode without an API key).
    #[error("invalid analysis config: {0}")]
    InvalidConfig(String),
    /// Every delegated call failed; nothing usable came back.
    #[error("text analysis unavailable: {0}")]
    Unavailable(String),
    /// A delegated call exceeded its time budget.
    #[error("{capability} timed out after {secs}s")]
    Timeout { capability: &'static str, secs: u64 },
    /// Transport-level failure talking to the remote model.
    #[error("analysis request failed: {0}")]
    Http(String),
    /// The remote model answered with something we could not use.
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
    /// An external tool (e.g. tesseract) could not be launched.
    #[error("tool `{tool}` unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },
}

impl AnalysisError {
    /// Whether the failure means the collaborator itself could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AnalysisError::Unavailable(_) | AnalysisError::Timeout { .. } | AnalysisError::Http(_)
        )
    }
}
