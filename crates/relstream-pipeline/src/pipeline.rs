//! Pipeline orchestrator
//!
//! Wires Document Source → Segment Engine → Batch Scheduler → result sink
//! into one runnable flow and manages shutdown across the stages. The
//! orchestrator adds no algorithmic content of its own: segmentation,
//! batching, and archiving each live in their own crate, and this module
//! only composes their lifecycles.

use crate::error::PipelineError;
use crate::sink::ResultSink;
use relstream_domain::{Document, DocumentResult, LanguageDetector, TokenCounter};
use relstream_scheduler::SchedulerHandle;
use relstream_segment::SegmentEngine;
use relstream_watcher::{archive_file, SourceEvent};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Totals for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Documents that reached a terminal outcome
    pub documents: usize,

    /// Triplets extracted across all documents
    pub triplets: usize,

    /// Documents whose result carries at least one failure marker
    pub failures: usize,
}

/// Composes the pipeline stages around a running scheduler.
///
/// The caller constructs the scheduler, spawns its run loop, and hands the
/// producer handle plus the results receiver to the pipeline. The pipeline
/// must own the only live [`SchedulerHandle`]; it drops the handle at
/// source exhaustion so the scheduler can drain and stop.
///
/// # Examples
///
/// ```
/// use relstream_domain::Document;
/// use relstream_model::MockExtractor;
/// use relstream_pipeline::{memory_source, Pipeline};
/// use relstream_scheduler::{BatchScheduler, SchedulerConfig};
/// use relstream_segment::{ScriptDetector, SegmentEngine, Segmenter, WhitespaceCounter};
///
/// tokio_test::block_on(async {
///     let engine = SegmentEngine::new(ScriptDetector, Segmenter::new(WhitespaceCounter, 1024));
///     let (handle, scheduler, results) =
///         BatchScheduler::new(SchedulerConfig::default(), MockExtractor::new()).unwrap();
///     tokio::spawn(scheduler.run());
///
///     let source = memory_source(vec![Document::new("d1", "Some text.")]);
///     let summary = Pipeline::new(engine, handle, results).run(source).await.unwrap();
///     assert_eq!(summary.documents, 1);
/// });
/// ```
pub struct Pipeline<D: LanguageDetector, C: TokenCounter> {
    engine: SegmentEngine<D, C>,
    handle: SchedulerHandle,
    results_rx: mpsc::Receiver<DocumentResult>,
    sink: Option<ResultSink>,
    archive_dir: Option<PathBuf>,
    forward_tx: Option<mpsc::Sender<DocumentResult>>,
    forced_language: Option<String>,
}

impl<D: LanguageDetector, C: TokenCounter> Pipeline<D, C> {
    /// Create a pipeline over a segment engine and a running scheduler.
    pub fn new(
        engine: SegmentEngine<D, C>,
        handle: SchedulerHandle,
        results_rx: mpsc::Receiver<DocumentResult>,
    ) -> Self {
        Self {
            engine,
            handle,
            results_rx,
            sink: None,
            archive_dir: None,
            forward_tx: None,
            forced_language: None,
        }
    }

    /// Persist each result as a JSON file through `sink`.
    pub fn with_sink(mut self, sink: ResultSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Move each result's source file into `archive_dir` once its result
    /// has been emitted.
    pub fn with_archive_dir(mut self, archive_dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(archive_dir.into());
        self
    }

    /// Forward each result on `tx` in addition to persisting it.
    pub fn with_forward(mut self, tx: mpsc::Sender<DocumentResult>) -> Self {
        self.forward_tx = Some(tx);
        self
    }

    /// Force one language for every document instead of detecting.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.forced_language = Some(language.into());
        self
    }

    /// Drive the pipeline until the source is exhausted.
    ///
    /// Documents are segmented and submitted as they arrive; results are
    /// consumed concurrently so scheduler backpressure can release. When
    /// the source ends the scheduler is closed, drained, and the summary of
    /// all terminal outcomes is returned. Every document yields exactly one
    /// terminal outcome regardless of which stage failed.
    ///
    /// # Errors
    ///
    /// Returns an error only when an orchestration task fails outright;
    /// per-document and per-batch failures are recorded in results and
    /// counted in the summary instead.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<SourceEvent>,
    ) -> Result<PipelineSummary, PipelineError> {
        let Self {
            engine,
            handle,
            mut results_rx,
            sink,
            archive_dir,
            forward_tx,
            forced_language,
        } = self;

        // Scheduler results and corrupt-file results merge onto one stream
        let (merged_tx, merged_rx) = mpsc::channel(64);
        let corrupt_tx = merged_tx.clone();

        let forwarder = tokio::spawn(async move {
            while let Some(result) = results_rx.recv().await {
                if merged_tx.send(result).await.is_err() {
                    break;
                }
            }
        });
        let consumer = tokio::spawn(consume(merged_rx, sink, archive_dir, forward_tx));

        while let Some(event) = events.recv().await {
            match event {
                SourceEvent::Ready(doc) => {
                    let segmented = engine.segment_document(&doc, forced_language.as_deref());

                    if handle
                        .register(
                            &segmented.id,
                            &segmented.language,
                            segmented.segments.len(),
                            segmented.source_path.clone(),
                        )
                        .await
                        .is_err()
                    {
                        warn!(doc_id = %segmented.id, "scheduler closed, stopping intake");
                        break;
                    }

                    let mut closed = false;
                    for segment in segmented.segments {
                        if handle.submit(segment).await.is_err() {
                            closed = true;
                            break;
                        }
                    }
                    if closed {
                        warn!("scheduler closed mid-document, stopping intake");
                        break;
                    }
                }
                SourceEvent::Corrupt { path, reason } => {
                    // The watcher already moved the file aside; record the
                    // terminal outcome so the file is accounted for
                    let result = DocumentResult::failed(id_from_path(&path), Some(path), reason);
                    if corrupt_tx.send(result).await.is_err() {
                        break;
                    }
                }
            }
        }

        drop(corrupt_tx);
        handle.close();
        // Dropping the handle releases its result sender so the merged
        // stream can end once the scheduler finishes draining
        drop(handle);

        let _ = forwarder.await;
        let summary = consumer
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?;

        info!(
            documents = summary.documents,
            triplets = summary.triplets,
            failures = summary.failures,
            "pipeline run complete"
        );
        Ok(summary)
    }
}

/// Consume merged results: persist, archive, forward, count.
async fn consume(
    mut merged_rx: mpsc::Receiver<DocumentResult>,
    sink: Option<ResultSink>,
    archive_dir: Option<PathBuf>,
    forward_tx: Option<mpsc::Sender<DocumentResult>>,
) -> PipelineSummary {
    let mut summary = PipelineSummary::default();

    while let Some(result) = merged_rx.recv().await {
        if let Some(sink) = &sink {
            if let Err(e) = sink.write(&result).await {
                warn!(doc_id = %result.doc_id, error = %e, "failed to persist result");
            }
        }

        if let (Some(dir), Some(path)) = (&archive_dir, &result.path) {
            // Corrupt files were already moved by the watcher; only archive
            // sources that are still in place
            if fs::try_exists(path).await.unwrap_or(false) {
                if let Err(e) = archive_file(path, dir).await {
                    warn!(path = %path.display(), error = %e, "failed to archive source file");
                }
            }
        }

        summary.documents += 1;
        summary.triplets += result.triplets.len();
        if !result.is_ok() {
            summary.failures += 1;
        }

        if let Some(tx) = &forward_tx {
            let _ = tx.send(result).await;
        }
    }

    summary
}

fn id_from_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Turn an in-memory document list into a source-event stream.
///
/// The programmatic counterpart of the directory watcher, used for tests
/// and one-shot processing.
pub fn memory_source(documents: Vec<Document>) -> mpsc::Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        for doc in documents {
            if tx.send(SourceEvent::Ready(doc)).await.is_err() {
                break;
            }
        }
    });
    rx
}
