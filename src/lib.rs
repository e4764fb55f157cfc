//! Workspace umbrella crate for the VidCred video credit engine.
//!
//! This crate stitches the stage crates together so callers can turn one
//! uploaded video into an [`AnalysisReport`] with a single entry point:
//!
//! 1. sample `K` evenly spaced frames into a request-scoped [`WorkArea`]
//! 2. fingerprint the frames and OCR them, concurrently
//! 3. remove the working area
//! 4. run the configured [`TextAnalyzer`] over the extracted text
//! 5. classify the fingerprint against the caller's [`Corpus`]
//! 6. score credits and assemble the report
//!
//! Only an unreadable source video (or an internal failure) aborts a request.
//! Everything else degrades into documented defaults plus a report warning.

pub mod config;
mod report;

pub use analysis::{
    AnalysisConfig, AnalysisError, AnalysisMode, KeywordAnalyzer, NoopExtractor,
    SUMMARY_UNAVAILABLE, TextAnalysis, TextAnalyzer, TextExtractor, analyze_text,
};
pub use credit::{CreditAward, CreditError, CreditPolicy, CreditScorer};
pub use matcher::{
    Corpus, CorpusEntry, CorpusPayload, DuplicateClassifier, DuplicateVerdict, MatchConfig,
    MatchError, ParsedCorpus, similarity,
};
pub use perceptual::{PerceptualConfig, PerceptualError, VideoFingerprint};
pub use sampler::{
    FfmpegSource, FrameSampler, SampledFrames, SamplerConfig, SamplerError, VideoSource,
    WorkArea,
};

pub use crate::config::{ConfigLoadError, PipelineConfig};
pub use crate::report::AnalysisReport;

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Errors that abort a pipeline run.
#[derive(Debug)]
pub enum PipelineError {
    Sampling(SamplerError),
    Perceptual(PerceptualError),
    Match(MatchError),
    Credit(CreditError),
    /// Raised only when `analysis.require_analysis` is set.
    Analysis(AnalysisError),
    Config(ConfigLoadError),
    /// A blocking task panicked or was cancelled.
    Join(String),
}

impl PipelineError {
    /// True when the uploaded video itself is at fault.
    pub fn is_unreadable_video(&self) -> bool {
        matches!(self, PipelineError::Sampling(err) if err.is_unreadable_video())
    }

    /// True when the delegated analysis collaborator could not be reached.
    pub fn is_analysis_unavailable(&self) -> bool {
        matches!(self, PipelineError::Analysis(err) if err.is_unavailable())
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Sampling(err) => write!(f, "frame sampling failed: {err}"),
            PipelineError::Perceptual(err) => write!(f, "fingerprinting failed: {err}"),
            PipelineError::Match(err) => write!(f, "duplicate check failed: {err}"),
            PipelineError::Credit(err) => write!(f, "credit scoring failed: {err}"),
            PipelineError::Analysis(err) => write!(f, "text analysis failed: {err}"),
            PipelineError::Config(err) => write!(f, "configuration error: {err}"),
            PipelineError::Join(reason) => write!(f, "background task failed: {reason}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Sampling(err) => Some(err),
            PipelineError::Perceptual(err) => Some(err),
            PipelineError::Match(err) => Some(err),
            PipelineError::Credit(err) => Some(err),
            PipelineError::Analysis(err) => Some(err),
            PipelineError::Config(err) => Some(err),
            PipelineError::Join(_) => None,
        }
    }
}

impl From<SamplerError> for PipelineError {
    fn from(value: SamplerError) -> Self {
        PipelineError::Sampling(value)
    }
}

impl From<PerceptualError> for PipelineError {
    fn from(value: PerceptualError) -> Self {
        PipelineError::Perceptual(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

impl From<CreditError> for PipelineError {
    fn from(value: CreditError) -> Self {
        PipelineError::Credit(value)
    }
}

impl From<AnalysisError> for PipelineError {
    fn from(value: AnalysisError) -> Self {
        PipelineError::Analysis(value)
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(value: tokio::task::JoinError) -> Self {
        PipelineError::Join(value.to_string())
    }
}

/// Pipeline stages reported to [`PipelineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Sampling,
    Fingerprint,
    Ocr,
    Analysis,
    Classify,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Sampling => "sampling",
            PipelineStage::Fingerprint => "fingerprint",
            PipelineStage::Ocr => "ocr",
            PipelineStage::Analysis => "analysis",
            PipelineStage::Classify => "classify",
        }
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_stage(&self, stage: PipelineStage, latency: Duration, success: bool);
    fn record_outcome(&self, verdict: &DuplicateVerdict, award: &CreditAward);
}

struct MetricsSpan<'a> {
    recorder: &'a dyn PipelineMetrics,
    stage: PipelineStage,
    start: Instant,
}

impl<'a> MetricsSpan<'a> {
    fn start(recorder: Option<&'a Arc<dyn PipelineMetrics>>, stage: PipelineStage) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: recorder.as_ref(),
            stage,
            start: Instant::now(),
        })
    }

    fn finish(self, success: bool) {
        self.recorder
            .record_stage(self.stage, self.start.elapsed(), success);
    }
}

fn finish_span(span: Option<MetricsSpan<'_>>, success: bool) {
    if let Some(span) = span {
        span.finish(success);
    }
}

/// End-to-end orchestrator.
///
/// Collaborators are constructed once and injected; the pipeline itself is
/// immutable and can be shared across concurrent requests behind an `Arc`.
pub struct Pipeline {
    config: PipelineConfig,
    sampler: FrameSampler,
    perceptual: PerceptualConfig,
    classifier: DuplicateClassifier,
    scorer: CreditScorer,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn TextAnalyzer>,
    metrics: Option<Arc<dyn PipelineMetrics>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.config.name)
            .field("bit_width", &self.bit_width())
            .field("analyzer", &self.analyzer.name())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Build a pipeline around explicit text collaborators.
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn TextAnalyzer>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        let perceptual = config.perceptual_config();
        let classifier = DuplicateClassifier::new(config.match_config())?;
        let scorer = CreditScorer::new(config.credit.clone())?;
        Ok(Self {
            sampler: FrameSampler::new(config.sampler_config()),
            perceptual,
            classifier,
            scorer,
            extractor,
            analyzer,
            metrics: None,
            config,
        })
    }

    /// Build a pipeline whose collaborators come from `config.analysis`.
    pub fn from_config(config: PipelineConfig) -> Result<Self, PipelineError> {
        let analyzer = analysis::build_analyzer(&config.analysis)?;
        let extractor = analysis::build_extractor(&config.analysis);
        Self::new(config, extractor, analyzer)
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Name of the configured text-analysis strategy.
    pub fn analyzer_name(&self) -> &'static str {
        self.analyzer.name()
    }

    /// Bit width of the fingerprints this pipeline produces.
    pub fn bit_width(&self) -> u32 {
        self.perceptual.bit_width()
    }

    /// Parse a corpus payload at this pipeline's fingerprint width.
    pub fn parse_corpus(&self, text: &str) -> ParsedCorpus {
        Corpus::from_json_lenient(text, self.bit_width())
    }

    /// Process the video at `path` with the bundled ffmpeg decoder.
    pub async fn process_file(
        &self,
        path: impl Into<PathBuf>,
        corpus: &Corpus,
        uploader: Option<&str>,
    ) -> Result<AnalysisReport, PipelineError> {
        let source = FfmpegSource::new(path, self.sampler.config());
        self.process(Arc::new(source), corpus, uploader).await
    }

    /// Run one upload through every stage.
    pub async fn process(
        &self,
        source: Arc<dyn VideoSource>,
        corpus: &Corpus,
        uploader: Option<&str>,
    ) -> Result<AnalysisReport, PipelineError> {
        let video = source.describe();
        let mut warnings = Vec::new();

        // Sampling
        let span = MetricsSpan::start(self.metrics.as_ref(), PipelineStage::Sampling);
        let sampler = self.sampler.clone();
        let work_root = self.config.sampler.work_root.clone();
        let sampled = tokio::task::spawn_blocking(move || -> Result<_, SamplerError> {
            let work = WorkArea::new(work_root.as_deref(), "frames")?;
            let frames = sampler.sample(source.as_ref(), &work)?;
            Ok((work, frames))
        })
        .await
        .map_err(PipelineError::from)
        .and_then(|res| res.map_err(PipelineError::from));
        finish_span(span, sampled.is_ok());
        let (work, frames) = sampled?;

        if !frames.is_complete() {
            warnings.push(format!(
                "only {} of {} frames could be decoded; duplicate check skipped",
                frames.len(),
                frames.requested
            ));
        }

        // Fingerprint and OCR read the same frames and do not depend on each other.
        let paths = Arc::new(frames.paths());
        let (fingerprint, blocks) = tokio::join!(
            self.fingerprint(Arc::clone(&paths)),
            self.extract_text(Arc::clone(&paths)),
        );
        drop(paths);
        drop(work);
        let fingerprint = fingerprint?;
        let blocks = blocks.unwrap_or_else(|err| {
            tracing::warn!(video = %video, error = %err, "text extraction failed; continuing without text");
            warnings.push(format!("text extraction failed: {err}"));
            Vec::new()
        });

        // Delegated analysis
        let span = MetricsSpan::start(self.metrics.as_ref(), PipelineStage::Analysis);
        let outcome =
            analyze_text(self.analyzer.as_ref(), &blocks, self.config.analysis.timeout()).await;
        finish_span(span, outcome.is_ok());
        let text = match outcome {
            Ok(text) => text,
            Err(err) if self.config.analysis.require_analysis => return Err(err.into()),
            Err(err) => {
                tracing::warn!(video = %video, error = %err, "text analysis unavailable; using defaults");
                warnings.push(format!("text analysis unavailable: {err}"));
                TextAnalysis {
                    summary: SUMMARY_UNAVAILABLE.to_string(),
                    ..TextAnalysis::no_text()
                }
            }
        };

        // Duplicate check and credits
        let span = MetricsSpan::start(self.metrics.as_ref(), PipelineStage::Classify);
        let verdict = self.classifier.classify(&fingerprint, corpus, uploader);
        finish_span(span, true);
        let award = self
            .scorer
            .score(text.difficulty, text.uniqueness, &verdict);
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(&verdict, &award);
        }

        tracing::info!(
            video = %video,
            similarity = verdict.similarity,
            is_duplicate = verdict.is_duplicate,
            credits = award.credits,
            "upload processed"
        );

        Ok(AnalysisReport::assemble(
            &fingerprint,
            text,
            &verdict,
            &award,
            warnings,
        ))
    }

    async fn fingerprint(&self, paths: Arc<Vec<PathBuf>>) -> Result<VideoFingerprint, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref(), PipelineStage::Fingerprint);
        let cfg = self.perceptual.clone();
        let result = tokio::task::spawn_blocking(move || perceptual::fingerprint_frames(paths.as_slice(), &cfg))
            .await
            .map_err(PipelineError::from)
            .and_then(|res| res.map_err(PipelineError::from));
        finish_span(span, result.is_ok());
        result
    }

    async fn extract_text(&self, paths: Arc<Vec<PathBuf>>) -> Result<Vec<String>, PipelineError> {
        let span = MetricsSpan::start(self.metrics.as_ref(), PipelineStage::Ocr);
        let extractor = Arc::clone(&self.extractor);
        let result = tokio::task::spawn_blocking(move || extractor.extract(paths.as_slice()))
            .await
            .map_err(PipelineError::from)
            .and_then(|res| res.map_err(PipelineError::from));
        finish_span(span, result.is_ok());
        result
    }
}

/// Load a pipeline from an optional YAML file, defaulting every stage.
pub fn load_pipeline(config_path: Option<&Path>) -> Result<Pipeline, PipelineError> {
    let config = match config_path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => {
            let mut config = PipelineConfig::default();
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
    };
    Pipeline::from_config(config)
}
