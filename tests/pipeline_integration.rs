mod common;

use std::sync::Arc;

use common::{
    FixedAnalyzer, Pattern, RecordingMetrics, ScriptedExtractor, ScriptedSource, config_in,
    lecture_text,
};
use tempfile::TempDir;
use vidcred::{
    Corpus, CorpusEntry, Pipeline, PipelineConfig, PipelineStage, VideoFingerprint,
};

fn pipeline(config: PipelineConfig, difficulty: u32, uniqueness: u32) -> Pipeline {
    Pipeline::new(
        config,
        Arc::new(ScriptedExtractor::text(&lecture_text())),
        Arc::new(FixedAnalyzer::new(difficulty, uniqueness)),
    )
    .expect("pipeline")
}

async fn fingerprint_of(pipeline: &Pipeline, source: ScriptedSource) -> VideoFingerprint {
    let report = pipeline
        .process(Arc::new(source), &Corpus::default(), None)
        .await
        .expect("report");
    VideoFingerprint::from_hex(&report.fingerprint, pipeline.bit_width()).expect("hex")
}

#[tokio::test]
async fn unique_upload_gets_provisional_credits() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 50, 50);

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("lecture.mp4", 120, Pattern::Columns)),
            &Corpus::default(),
            Some("alice"),
        )
        .await
        .expect("report");

    assert_eq!(report.credits, 275);
    assert_eq!(report.difficulty, Some(50));
    assert_eq!(report.uniqueness, 50);
    assert_eq!(report.summary, "A lecture on sorting.");
    assert_eq!(report.topic, "algorithms");
    assert!(!report.is_duplicate);
    assert_eq!(report.similarity, 0.0);
    // Ten 64-bit hashes, 16 hex digits each.
    assert_eq!(report.fingerprint.len(), 160);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[tokio::test]
async fn same_owner_reupload_earns_nothing() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 80, 90);
    let original = fingerprint_of(
        &pipeline,
        ScriptedSource::new("first.mp4", 120, Pattern::Columns),
    )
    .await;
    let corpus = Corpus::new(vec![CorpusEntry::new(original, "alice")]);

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("again.mp4", 120, Pattern::Columns)),
            &corpus,
            Some("alice"),
        )
        .await
        .unwrap();

    assert!(report.is_duplicate);
    assert_eq!(report.similarity, 100.0);
    assert_eq!(report.credits, 0);
    assert_eq!(report.matched_owner.as_deref(), Some("alice"));
    assert!(report.similarity_message.contains("already uploaded"));
}

#[tokio::test]
async fn cross_owner_copy_is_penalised() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 50, 50);
    let original = fingerprint_of(
        &pipeline,
        ScriptedSource::new("theirs.mp4", 120, Pattern::Columns),
    )
    .await;
    let corpus = Corpus::new(vec![CorpusEntry::new(original, "bob")]);

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("mine.mp4", 120, Pattern::Columns)),
            &corpus,
            Some("alice"),
        )
        .await
        .unwrap();

    assert!(report.is_duplicate);
    assert_eq!(report.credits, 0);
    assert!(report.similarity_message.contains("another user's upload"));
}

#[tokio::test]
async fn different_content_is_not_a_duplicate() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 50, 50);
    let other = fingerprint_of(
        &pipeline,
        ScriptedSource::new("rows.mp4", 120, Pattern::Rows),
    )
    .await;
    let corpus = Corpus::new(vec![CorpusEntry::new(other, "bob")]);

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("columns.mp4", 120, Pattern::Columns)),
            &corpus,
            Some("alice"),
        )
        .await
        .unwrap();

    assert!(!report.is_duplicate);
    assert!(report.similarity < 95.0, "similarity {}", report.similarity);
    assert_eq!(report.credits, 275);
    assert_eq!(report.matched_owner.as_deref(), Some("bob"));
}

#[tokio::test]
async fn work_area_is_removed_after_processing() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 50, 50);
    let source = Arc::new(ScriptedSource::new("lecture.mp4", 30, Pattern::Rows));

    pipeline
        .process(source.clone(), &Corpus::default(), None)
        .await
        .unwrap();

    let dirs = source.dirs();
    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].starts_with(root.path()));
    assert!(!dirs[0].exists());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn ocr_failure_is_a_warning() {
    let root = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        config_in(root.path()),
        Arc::new(ScriptedExtractor::failing()),
        Arc::new(FixedAnalyzer::new(50, 50)),
    )
    .unwrap();

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("silent.mp4", 60, Pattern::Columns)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.summary, "No readable text found.");
    assert_eq!(report.topic, "Unknown");
    assert_eq!(report.difficulty, None);
    assert_eq!(report.credits, 50);
    assert!(report.warnings.iter().any(|w| w.contains("text extraction failed")));
    assert!(report.warnings.iter().any(|w| w.contains("default 50 credits")));
}

#[tokio::test]
async fn no_text_uses_fallback_credits() {
    let root = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        config_in(root.path()),
        Arc::new(ScriptedExtractor::text(&[])),
        Arc::new(FixedAnalyzer::new(99, 99)),
    )
    .unwrap();

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("blank.mp4", 60, Pattern::Columns)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.credits, 50);
    assert_eq!(report.uniqueness, 0);
}

#[tokio::test]
async fn unreachable_analyzer_degrades_to_defaults() {
    let root = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        config_in(root.path()),
        Arc::new(ScriptedExtractor::text(&lecture_text())),
        Arc::new(FixedAnalyzer::unreachable()),
    )
    .unwrap();

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("lecture.mp4", 60, Pattern::Columns)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(report.summary, "Summary unavailable.");
    assert_eq!(report.credits, 50);
    assert!(report.warnings.iter().any(|w| w.contains("text analysis unavailable")));
}

#[tokio::test]
async fn required_analysis_fails_the_request() {
    let root = TempDir::new().unwrap();
    let mut config = config_in(root.path());
    config.analysis.require_analysis = true;
    let pipeline = Pipeline::new(
        config,
        Arc::new(ScriptedExtractor::text(&lecture_text())),
        Arc::new(FixedAnalyzer::unreachable()),
    )
    .unwrap();

    let err = pipeline
        .process(
            Arc::new(ScriptedSource::new("lecture.mp4", 60, Pattern::Columns)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap_err();

    assert!(err.is_analysis_unavailable(), "{err}");
    assert!(!err.is_unreadable_video());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn short_video_is_incomparable() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(config_in(root.path()), 50, 50);
    let original = fingerprint_of(
        &pipeline,
        ScriptedSource::new("long.mp4", 120, Pattern::Columns),
    )
    .await;
    let corpus = Corpus::new(vec![CorpusEntry::new(original, "alice")]);

    let report = pipeline
        .process(
            Arc::new(ScriptedSource::new("short.mp4", 4, Pattern::Columns)),
            &corpus,
            Some("alice"),
        )
        .await
        .unwrap();

    assert_eq!(report.fingerprint.len(), 4 * 16);
    assert_eq!(report.similarity, 0.0);
    assert!(!report.is_duplicate);
    assert_eq!(report.credits, 275);
    assert!(report.warnings.iter().any(|w| w.contains("only 4 of 10 frames")));
}

#[tokio::test]
async fn metrics_observe_every_stage() {
    let root = TempDir::new().unwrap();
    let metrics = Arc::new(RecordingMetrics::default());
    let pipeline = pipeline(config_in(root.path()), 50, 50).with_metrics(metrics.clone());

    pipeline
        .process(
            Arc::new(ScriptedSource::new("lecture.mp4", 60, Pattern::Columns)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();

    let stages: Vec<PipelineStage> = metrics
        .stages
        .lock()
        .unwrap()
        .iter()
        .map(|(stage, ok)| {
            assert!(*ok, "{stage:?} failed");
            *stage
        })
        .collect();
    for stage in [
        PipelineStage::Sampling,
        PipelineStage::Fingerprint,
        PipelineStage::Ocr,
        PipelineStage::Analysis,
        PipelineStage::Classify,
    ] {
        assert!(stages.contains(&stage), "missing {stage:?}");
    }
    assert_eq!(*metrics.outcomes.lock().unwrap(), vec![(false, 275)]);
}
