//! Shared fixtures for the integration tests: a scripted video source that
//! renders synthetic frames, plus scripted text collaborators.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{GrayImage, Luma};
use vidcred::{
    AnalysisError, PipelineConfig, PipelineMetrics, PipelineStage, SamplerError, TextAnalyzer,
    TextExtractor, VideoSource,
};
use vidcred::{CreditAward, DuplicateVerdict};

const SIDE: u32 = 64;

/// Frame layouts. Each frame is split in two halves; even frame indices light
/// one half and odd indices the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Left/right halves.
    Columns,
    /// Top/bottom halves.
    Rows,
}

/// In-memory stand-in for a decodable video file.
pub struct ScriptedSource {
    pub name: String,
    pub total: u64,
    pub pattern: Pattern,
    /// Decode at most this many frames per request.
    pub decodable: Option<usize>,
    pub seen_dirs: Mutex<Vec<PathBuf>>,
}

impl ScriptedSource {
    pub fn new(name: &str, total: u64, pattern: Pattern) -> Self {
        Self {
            name: name.to_string(),
            total,
            pattern,
            decodable: None,
            seen_dirs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_decodable(mut self, n: usize) -> Self {
        self.decodable = Some(n);
        self
    }

    pub fn render(&self, index: u64) -> GrayImage {
        let lit_first = index % 2 == 0;
        GrayImage::from_fn(SIDE, SIDE, |x, y| {
            let coord = match self.pattern {
                Pattern::Columns => x,
                Pattern::Rows => y,
            };
            let first_half = coord < SIDE / 2;
            if first_half == lit_first {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.seen_dirs.lock().unwrap().clone()
    }
}

impl VideoSource for ScriptedSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn frame_count(&self) -> Result<u64, SamplerError> {
        Ok(self.total)
    }

    fn extract_frames(&self, indices: &[u64], dest: &Path) -> Result<Vec<PathBuf>, SamplerError> {
        self.seen_dirs.lock().unwrap().push(dest.to_path_buf());
        let limit = self.decodable.unwrap_or(indices.len());
        let mut out = Vec::new();
        for (n, &idx) in indices.iter().take(limit).enumerate() {
            let path = dest.join(format!("frame_{:04}.png", n + 1));
            self.render(idx)
                .save(&path)
                .map_err(|e| SamplerError::UnreadableVideo {
                    path: self.name.clone(),
                    reason: e.to_string(),
                })?;
            out.push(path);
        }
        Ok(out)
    }
}

/// Extractor returning fixed text, or failing.
pub struct ScriptedExtractor {
    pub blocks: Option<Vec<String>>,
}

impl ScriptedExtractor {
    pub fn text(blocks: &[&str]) -> Self {
        Self {
            blocks: Some(blocks.iter().map(|b| b.to_string()).collect()),
        }
    }

    pub fn failing() -> Self {
        Self { blocks: None }
    }
}

impl TextExtractor for ScriptedExtractor {
    fn extract(&self, frames: &[PathBuf]) -> Result<Vec<String>, AnalysisError> {
        assert!(frames.iter().all(|f| f.exists()), "frames must exist during OCR");
        self.blocks.clone().ok_or_else(|| AnalysisError::ToolUnavailable {
            tool: "tesseract".into(),
            reason: "not installed".into(),
        })
    }
}

/// Analyzer with fixed answers; `reachable = false` fails every call.
pub struct FixedAnalyzer {
    pub difficulty: u32,
    pub uniqueness: u32,
    pub reachable: bool,
}

impl FixedAnalyzer {
    pub fn new(difficulty: u32, uniqueness: u32) -> Self {
        Self {
            difficulty,
            uniqueness,
            reachable: true,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            difficulty: 0,
            uniqueness: 0,
            reachable: false,
        }
    }

    fn check(&self) -> Result<(), AnalysisError> {
        if self.reachable {
            Ok(())
        } else {
            Err(AnalysisError::Http("connection refused".into()))
        }
    }
}

#[async_trait]
impl TextAnalyzer for FixedAnalyzer {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn summarize(&self, _text: &str) -> Result<String, AnalysisError> {
        self.check()?;
        Ok("A lecture on sorting.".into())
    }

    async fn classify_topic(&self, _text: &str) -> Result<String, AnalysisError> {
        self.check()?;
        Ok("algorithms".into())
    }

    async fn score_difficulty(&self, _text: &str) -> Result<u32, AnalysisError> {
        self.check()?;
        Ok(self.difficulty)
    }

    async fn score_uniqueness(&self, _text: &str) -> Result<u32, AnalysisError> {
        self.check()?;
        Ok(self.uniqueness)
    }
}

#[derive(Default)]
pub struct RecordingMetrics {
    pub stages: Mutex<Vec<(PipelineStage, bool)>>,
    pub outcomes: Mutex<Vec<(bool, u32)>>,
}

impl PipelineMetrics for RecordingMetrics {
    fn record_stage(&self, stage: PipelineStage, _latency: Duration, success: bool) {
        self.stages.lock().unwrap().push((stage, success));
    }

    fn record_outcome(&self, verdict: &DuplicateVerdict, award: &CreditAward) {
        self.outcomes
            .lock()
            .unwrap()
            .push((verdict.is_duplicate, award.credits));
    }
}

/// Defaults with work areas rooted under `root`.
pub fn config_in(root: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.sampler.work_root = Some(root.to_path_buf());
    config
}

pub fn lecture_text() -> Vec<&'static str> {
    vec![
        "Merge sort splits the array in halves.",
        "Each half is sorted recursively and merged.",
    ]
}
