use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vidcred::{
    CreditAward, DuplicateVerdict, FfmpegSource, Pipeline, PipelineMetrics, PipelineStage,
    SamplerConfig, VideoSource,
};

/// Opens an uploaded file as a decodable video.
pub type SourceFactory = Arc<dyn Fn(PathBuf) -> Arc<dyn VideoSource> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Pipeline shared across requests; constructed once at start-up.
    pub pipeline: Arc<Pipeline>,

    /// Turns an uploaded file into a [`VideoSource`].
    pub sources: SourceFactory,

    /// Prometheus render handle, when metrics are enabled.
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Build the pipeline from `config.pipeline_config` and install the
    /// Prometheus recorder.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let prometheus = if config.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| ServerError::Config(format!("metrics recorder: {e}")))?;
            Some(handle)
        } else {
            None
        };

        let mut pipeline = vidcred::load_pipeline(config.pipeline_config.as_deref())?;
        if prometheus.is_some() {
            pipeline = pipeline.with_metrics(Arc::new(PrometheusMetrics));
        }
        let sources = ffmpeg_sources(pipeline.config().sampler_config());

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sources,
            prometheus,
        })
    }

    /// State around an existing pipeline and source factory, without a
    /// global metrics recorder.
    pub fn with_pipeline(config: ServerConfig, pipeline: Pipeline, sources: SourceFactory) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            sources,
            prometheus: None,
        }
    }
}

/// Factory that decodes uploads with ffmpeg.
pub fn ffmpeg_sources(cfg: SamplerConfig) -> SourceFactory {
    Arc::new(move |path: PathBuf| Arc::new(FfmpegSource::new(path, &cfg)) as Arc<dyn VideoSource>)
}

/// Forwards pipeline observations to the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl PipelineMetrics for PrometheusMetrics {
    fn record_stage(&self, stage: PipelineStage, latency: Duration, success: bool) {
        metrics::histogram!("vidcred_stage_duration_seconds", "stage" => stage.as_str())
            .record(latency.as_secs_f64());
        if !success {
            metrics::counter!("vidcred_stage_failures_total", "stage" => stage.as_str())
                .increment(1);
        }
    }

    fn record_outcome(&self, verdict: &DuplicateVerdict, award: &CreditAward) {
        let outcome = match (verdict.is_duplicate, verdict.same_owner_as_match) {
            (false, _) => "unique",
            (true, true) => "same_owner_duplicate",
            (true, false) => "cross_owner_duplicate",
        };
        metrics::counter!("vidcred_uploads_total", "outcome" => outcome).increment(1);
        metrics::histogram!("vidcred_similarity_percent").record(verdict.similarity);
        metrics::histogram!("vidcred_credits_awarded").record(f64::from(award.credits));
        if award.fallback {
            metrics::counter!("vidcred_credit_fallbacks_total").increment(1);
        }
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
    pub analyzer: String,
    pub fingerprint_bits: u32,
}
