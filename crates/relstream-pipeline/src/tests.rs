//! End-to-end pipeline tests
//!
//! These exercise the composed flow with the mock extractor: in-memory and
//! filesystem sources, batching behavior, failure isolation, and the
//! archive/sink side effects.

use crate::{memory_source, Pipeline, ResultSink};
use relstream_domain::{Document, DocumentResult, Triplet};
use relstream_model::MockExtractor;
use relstream_scheduler::{BatchScheduler, SchedulerConfig, SchedulerHandle};
use relstream_segment::{ScriptDetector, SegmentEngine, Segmenter, WhitespaceCounter};
use relstream_watcher::{DirectoryWatcher, SourceEvent, WatcherConfig};
use std::time::Duration;
use tokio::fs;
use tokio::sync::mpsc;

fn engine(max_tokens: usize) -> SegmentEngine<ScriptDetector, WhitespaceCounter> {
    SegmentEngine::new(ScriptDetector, Segmenter::new(WhitespaceCounter, max_tokens))
}

fn scheduler(
    config: SchedulerConfig,
    extractor: MockExtractor,
) -> (SchedulerHandle, mpsc::Receiver<DocumentResult>) {
    let (handle, scheduler, results) = BatchScheduler::new(config, extractor).unwrap();
    tokio::spawn(scheduler.run());
    (handle, results)
}

#[tokio::test]
async fn test_single_document_end_to_end() {
    let mut extractor = MockExtractor::new();
    extractor.add_response(
        "Apple Inc. is headquartered in Cupertino.",
        vec![Triplet::new(
            "Apple Inc.",
            "ORG",
            "headquarters location",
            "Cupertino",
            "LOC",
        )],
    );

    let (handle, results) = scheduler(SchedulerConfig::default(), extractor);
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let source = memory_source(vec![Document::new(
        "d1",
        "Apple Inc. is headquartered in Cupertino.",
    )]);
    let summary = Pipeline::new(engine(1024), handle, results)
        .with_forward(forward_tx)
        .run(source)
        .await
        .unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.triplets, 1);
    assert_eq!(summary.failures, 0);

    let result = forwarded.recv().await.unwrap();
    assert_eq!(result.doc_id, "d1");
    assert_eq!(result.num_segments, 1);
    assert_eq!(result.triplets[0].head, "Apple Inc.");
    assert_eq!(result.triplets[0].tail, "Cupertino");
}

#[tokio::test]
async fn test_two_documents_batched_across_boundaries() {
    // Five 3-word sentences per document; a budget of 5 estimated tokens
    // holds exactly one sentence, so each document becomes 5 segments and
    // the 10 segments form batches of 8 and 2
    let extractor = MockExtractor::new();
    let counter = extractor.clone();

    let (handle, results) = scheduler(SchedulerConfig::default(), extractor);
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let text = "Aa bb cc. Dd ee ff. Gg hh ii. Jj kk ll. Mm nn oo.";
    let source = memory_source(vec![
        Document::new("first", text),
        Document::new("second", text),
    ]);

    let summary = Pipeline::new(engine(6), handle, results)
        .with_forward(forward_tx)
        .run(source)
        .await
        .unwrap();

    assert_eq!(summary.documents, 2);
    assert_eq!(counter.call_count(), 2);

    let mut ids = Vec::new();
    while let Some(result) = forwarded.recv().await {
        assert_eq!(result.num_segments, 5);
        ids.push(result.doc_id);
    }
    ids.sort();
    assert_eq!(ids, vec!["first", "second"]);
}

#[tokio::test]
async fn test_batch_failure_does_not_abort_run() {
    let mut extractor = MockExtractor::new();
    extractor.add_response("Good text.", vec![Triplet::new("A", "T", "r", "B", "T")]);
    extractor.fail_on_text("Poison text.");

    let config = SchedulerConfig {
        batch_size: 1,
        flush_interval_ms: 20,
        ..Default::default()
    };
    let (handle, results) = scheduler(config, extractor);
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let source = memory_source(vec![
        Document::new("good", "Good text."),
        Document::new("bad", "Poison text."),
    ]);
    let summary = Pipeline::new(engine(1024), handle, results)
        .with_forward(forward_tx)
        .run(source)
        .await
        .unwrap();

    assert_eq!(summary.documents, 2);
    assert_eq!(summary.failures, 1);

    let mut outcomes = std::collections::HashMap::new();
    while let Some(result) = forwarded.recv().await {
        outcomes.insert(result.doc_id.clone(), result);
    }
    assert!(outcomes["good"].is_ok());
    assert_eq!(outcomes["good"].triplets.len(), 1);
    assert!(!outcomes["bad"].is_ok());
}

#[tokio::test]
async fn test_empty_document_gets_empty_result() {
    let (handle, results) = scheduler(SchedulerConfig::default(), MockExtractor::new());
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let source = memory_source(vec![Document::new("blank", "   \n  ")]);
    let summary = Pipeline::new(engine(1024), handle, results)
        .with_forward(forward_tx)
        .run(source)
        .await
        .unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.failures, 0);

    let result = forwarded.recv().await.unwrap();
    assert_eq!(result.doc_id, "blank");
    assert_eq!(result.num_segments, 0);
    assert!(result.triplets.is_empty());
}

#[tokio::test]
async fn test_corrupt_source_event_counted_as_failure() {
    let (handle, results) = scheduler(SchedulerConfig::default(), MockExtractor::new());
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let (events_tx, events_rx) = mpsc::channel(8);
    events_tx
        .send(SourceEvent::Corrupt {
            path: "/in/garbled.txt".into(),
            reason: "not valid UTF-8".to_string(),
        })
        .await
        .unwrap();
    drop(events_tx);

    let summary = Pipeline::new(engine(1024), handle, results)
        .with_forward(forward_tx)
        .run(events_rx)
        .await
        .unwrap();

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.failures, 1);

    let result = forwarded.recv().await.unwrap();
    assert_eq!(result.doc_id, "garbled");
    assert!(!result.is_ok());
}

#[tokio::test]
async fn test_file_flows_through_to_archive_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let archive_dir = dir.path().join("archive");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&input_dir).await.unwrap();

    let text = "Apple Inc. is headquartered in Cupertino.";
    fs::write(input_dir.join("d1.txt"), text).await.unwrap();

    let mut extractor = MockExtractor::new();
    extractor.add_response(
        text,
        vec![Triplet::new(
            "Apple Inc.",
            "ORG",
            "headquarters location",
            "Cupertino",
            "LOC",
        )],
    );

    let mut watcher_config = WatcherConfig::new(&input_dir, &archive_dir);
    watcher_config.poll_interval_ms = 10;
    watcher_config.debounce_ms = 40;
    let (watcher_handle, events) = DirectoryWatcher::new(watcher_config).unwrap().spawn();

    let (handle, results) = scheduler(SchedulerConfig::default(), extractor);
    let (forward_tx, mut forwarded) = mpsc::channel(8);

    let pipeline_task = tokio::spawn(
        Pipeline::new(engine(1024), handle, results)
            .with_sink(ResultSink::new(&output_dir))
            .with_archive_dir(&archive_dir)
            .with_forward(forward_tx)
            .run(events),
    );

    // The file appears as exactly one document
    let result = tokio::time::timeout(Duration::from_secs(5), forwarded.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.doc_id, "d1");
    assert_eq!(result.triplets.len(), 1);

    watcher_handle.stop().await;
    let summary = pipeline_task.await.unwrap().unwrap();
    assert_eq!(summary.documents, 1);

    // Input file moved to the archive with identical content
    assert!(!fs::try_exists(input_dir.join("d1.txt")).await.unwrap());
    assert_eq!(
        fs::read_to_string(archive_dir.join("d1.txt")).await.unwrap(),
        text
    );

    // Output record written with the stable shape
    let written = fs::read_to_string(output_dir.join("d1_relations.json"))
        .await
        .unwrap();
    let parsed: DocumentResult = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed.doc_id, "d1");
    assert_eq!(parsed.language, "en_XX");
    assert_eq!(parsed.num_segments, 1);
}
