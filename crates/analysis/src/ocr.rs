//! OCR over sampled frames.
//!
//! Extractors are blocking; the orchestrator runs them on the blocking pool.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::AnalysisError;

/// Turns frame images into ordered, de-duplicated text blocks.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, frames: &[PathBuf]) -> Result<Vec<String>, AnalysisError>;
}

/// Keep non-empty blocks that differ from the block kept just before them,
/// stopping after `max_blocks`.
pub fn collect_blocks<I>(raw: I, max_blocks: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut blocks: Vec<String> = Vec::new();
    for text in raw {
        if blocks.len() >= max_blocks {
            break;
        }
        let text = text.trim();
        if text.is_empty() || blocks.last().is_some_and(|prev| prev == text) {
            continue;
        }
        blocks.push(text.to_string());
    }
    blocks
}

/// Runs `tesseract <frame> stdout` once per frame.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    bin: String,
    max_blocks: usize,
}

impl TesseractExtractor {
    pub fn new(bin: impl Into<String>, max_blocks: usize) -> Self {
        Self {
            bin: bin.into(),
            max_blocks,
        }
    }

    fn read_frame(&self, frame: &Path) -> Result<Option<String>, AnalysisError> {
        let output = Command::new(&self.bin)
            .arg(frame)
            .arg("stdout")
            .output()
            .map_err(|e| AnalysisError::ToolUnavailable {
                tool: self.bin.clone(),
                reason: if e.kind() == ErrorKind::NotFound {
                    "executable not found".into()
                } else {
                    e.to_string()
                },
            })?;

        if !output.status.success() {
            tracing::warn!(
                frame = %frame.display(),
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "OCR failed for frame; skipping"
            );
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract(&self, frames: &[PathBuf]) -> Result<Vec<String>, AnalysisError> {
        let mut raw = Vec::with_capacity(frames.len());
        for frame in frames {
            if let Some(text) = self.read_frame(frame)? {
                raw.push(text);
            }
        }
        let blocks = collect_blocks(raw, self.max_blocks);
        tracing::info!(frames = frames.len(), blocks = blocks.len(), "OCR complete");
        Ok(blocks)
    }
}

/// Extractor for deployments without OCR; always yields no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtractor;

impl TextExtractor for NoopExtractor {
    fn extract(&self, _frames: &[PathBuf]) -> Result<Vec<String>, AnalysisError> {
        Ok(Vec::new())
    }
}
