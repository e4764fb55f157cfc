mod common;

use std::sync::Arc;

use common::{FixedAnalyzer, Pattern, ScriptedExtractor, ScriptedSource, config_in, lecture_text};
use tempfile::TempDir;
use vidcred::{Corpus, Pipeline, similarity, VideoFingerprint};

fn pipeline(root: &std::path::Path) -> Arc<Pipeline> {
    Arc::new(
        Pipeline::new(
            config_in(root),
            Arc::new(ScriptedExtractor::text(&lecture_text())),
            Arc::new(FixedAnalyzer::new(30, 60)),
        )
        .expect("pipeline"),
    )
}

fn decode(pipeline: &Pipeline, hex: &str) -> VideoFingerprint {
    VideoFingerprint::from_hex(hex, pipeline.bit_width()).expect("hex")
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(root.path());

    let first = pipeline
        .process(
            Arc::new(ScriptedSource::new("a.mp4", 240, Pattern::Columns)),
            &Corpus::default(),
            Some("alice"),
        )
        .await
        .expect("first run");
    let second = pipeline
        .process(
            Arc::new(ScriptedSource::new("a.mp4", 240, Pattern::Columns)),
            &Corpus::default(),
            Some("alice"),
        )
        .await
        .expect("second run");

    assert_eq!(first, second);
}

#[tokio::test]
async fn parallel_and_sequential_hashing_agree() {
    let root = TempDir::new().unwrap();
    let parallel = pipeline(root.path());

    let mut config = config_in(root.path());
    config.perceptual.use_parallel = false;
    config.matcher.use_parallel = false;
    let sequential = Pipeline::new(
        config,
        Arc::new(ScriptedExtractor::text(&lecture_text())),
        Arc::new(FixedAnalyzer::new(30, 60)),
    )
    .unwrap();

    let a = parallel
        .process(
            Arc::new(ScriptedSource::new("p.mp4", 90, Pattern::Rows)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();
    let b = sequential
        .process(
            Arc::new(ScriptedSource::new("p.mp4", 90, Pattern::Rows)),
            &Corpus::default(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_uploads_use_separate_work_areas() {
    let root = TempDir::new().unwrap();
    let pipeline = pipeline(root.path());

    let sources: Vec<Arc<ScriptedSource>> = (0..6)
        .map(|i| {
            let pattern = if i % 2 == 0 { Pattern::Columns } else { Pattern::Rows };
            Arc::new(ScriptedSource::new(&format!("upload-{i}.mp4"), 100, pattern))
        })
        .collect();

    let handles: Vec<_> = sources
        .iter()
        .map(|source| {
            let pipeline = Arc::clone(&pipeline);
            let source = Arc::clone(source);
            tokio::spawn(async move {
                pipeline
                    .process(source, &Corpus::default(), None)
                    .await
                    .expect("report")
            })
        })
        .collect();

    let mut reports = Vec::new();
    for handle in handles {
        reports.push(handle.await.expect("task"));
    }

    let mut dirs: Vec<_> = sources.iter().flat_map(|s| s.dirs()).collect();
    dirs.sort();
    dirs.dedup();
    assert_eq!(dirs.len(), sources.len(), "every upload gets its own work area");
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);

    // Same pattern means same content; the frame sets did not leak.
    let columns = decode(&pipeline, &reports[0].fingerprint);
    let rows = decode(&pipeline, &reports[1].fingerprint);
    for (i, report) in reports.iter().enumerate() {
        let fp = decode(&pipeline, &report.fingerprint);
        let expected = if i % 2 == 0 { &columns } else { &rows };
        assert_eq!(similarity(&fp, expected), 100.0, "upload {i}");
    }
    assert!(similarity(&columns, &rows) < 95.0);
}
