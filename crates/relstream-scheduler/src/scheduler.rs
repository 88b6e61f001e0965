//! Batch scheduler
//!
//! Decouples segment arrival rate from extraction throughput. Producers
//! submit segments through a [`SchedulerHandle`]; the [`BatchScheduler`] run
//! loop collects them FIFO into batches of at most `batch_size`, dispatches
//! one batch at a time to the extractor on a blocking worker thread, and
//! emits a [`DocumentResult`] for every document whose segments have all
//! resolved, in completion order.
//!
//! The bounded queue is the sole backpressure mechanism: `submit` suspends
//! when `queue_size` segments are pending and resumes only when the run loop
//! dequeues.

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::ledger::{PendingLedger, SegmentOutcome};
use relstream_domain::{DocumentResult, ExtractionInput, RelationExtractor, Segment};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Producer-side handle to a running scheduler.
///
/// Cheap to clone; all clones share one queue and one ledger, and `close` on
/// any clone closes the scheduler for all of them.
#[derive(Clone)]
pub struct SchedulerHandle {
    queue_tx: Arc<Mutex<Option<mpsc::Sender<Segment>>>>,
    results_tx: mpsc::Sender<DocumentResult>,
    ledger: Arc<PendingLedger>,
    submit_timeout_ms: Option<u64>,
}

impl SchedulerHandle {
    /// Register a document before submitting its segments.
    ///
    /// The expected segment count is known up front because the segment
    /// engine yields the whole sequence at once. A document with zero
    /// segments gets its empty result immediately and never occupies the
    /// queue.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` after `close`.
    pub async fn register(
        &self,
        doc_id: &str,
        language: &str,
        expected_segments: usize,
        source_path: Option<PathBuf>,
    ) -> Result<(), SchedulerError> {
        if self.queue_tx.lock().unwrap().is_none() {
            return Err(SchedulerError::Closed);
        }

        if let Some(result) = self
            .ledger
            .register(doc_id, language, expected_segments, source_path)
        {
            self.results_tx
                .send(result)
                .await
                .map_err(|_| SchedulerError::Closed)?;
        }
        Ok(())
    }

    /// Enqueue a segment, suspending while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::Closed` after `close`, or
    /// `SchedulerError::SubmitTimeout` when a configured bounded wait
    /// elapses with the queue still full. A timed-out segment is not
    /// enqueued; the caller decides whether to retry or escalate.
    pub async fn submit(&self, segment: Segment) -> Result<(), SchedulerError> {
        // Clone out of the lock so it is not held across the await
        let tx = self
            .queue_tx
            .lock()
            .unwrap()
            .clone()
            .ok_or(SchedulerError::Closed)?;

        match self.submit_timeout_ms {
            None => tx.send(segment).await.map_err(|_| SchedulerError::Closed),
            Some(ms) => match timeout(Duration::from_millis(ms), tx.send(segment)).await {
                Ok(sent) => sent.map_err(|_| SchedulerError::Closed),
                Err(_) => Err(SchedulerError::SubmitTimeout(ms)),
            },
        }
    }

    /// Close the scheduler for new work.
    ///
    /// Idempotent. Already-queued segments are still processed; the run
    /// loop flushes a final partial batch and then returns. Subsequent
    /// `submit` and `register` calls fail with `SchedulerError::Closed`.
    pub fn close(&self) {
        if self.queue_tx.lock().unwrap().take().is_some() {
            debug!("scheduler closed for new submissions");
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.queue_tx.lock().unwrap().is_none()
    }
}

/// The consumer side: batch formation, dispatch, and result emission.
///
/// # Examples
///
/// ```
/// use relstream_scheduler::{BatchScheduler, SchedulerConfig};
/// use relstream_domain::Segment;
/// use relstream_model::MockExtractor;
///
/// tokio_test::block_on(async {
///     let (handle, scheduler, mut results) =
///         BatchScheduler::new(SchedulerConfig::default(), MockExtractor::new()).unwrap();
///     let runner = tokio::spawn(scheduler.run());
///
///     handle.register("d1", "en_XX", 1, None).await.unwrap();
///     handle
///         .submit(Segment::new("d1", 0, "Apple Inc. is headquartered in Cupertino.", "en_XX"))
///         .await
///         .unwrap();
///     handle.close();
///
///     let result = results.recv().await.unwrap();
///     assert_eq!(result.doc_id, "d1");
///     runner.await.unwrap();
/// });
/// ```
pub struct BatchScheduler<E: RelationExtractor> {
    config: SchedulerConfig,
    extractor: Arc<E>,
    queue_rx: mpsc::Receiver<Segment>,
    results_tx: mpsc::Sender<DocumentResult>,
    ledger: Arc<PendingLedger>,
}

impl<E> BatchScheduler<E>
where
    E: RelationExtractor + Send + Sync + 'static,
{
    /// Create a scheduler around an extractor.
    ///
    /// Returns the producer handle, the scheduler itself (to be driven via
    /// [`BatchScheduler::run`]), and the receiver on which document results
    /// arrive.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` for an invalid configuration.
    #[allow(clippy::type_complexity)]
    pub fn new(
        config: SchedulerConfig,
        extractor: E,
    ) -> Result<
        (
            SchedulerHandle,
            BatchScheduler<E>,
            mpsc::Receiver<DocumentResult>,
        ),
        SchedulerError,
    > {
        config.validate()?;

        let (queue_tx, queue_rx) = mpsc::channel(config.queue_size);
        let (results_tx, results_rx) = mpsc::channel(config.queue_size);
        let ledger = Arc::new(PendingLedger::new());

        let handle = SchedulerHandle {
            queue_tx: Arc::new(Mutex::new(Some(queue_tx))),
            results_tx: results_tx.clone(),
            ledger: Arc::clone(&ledger),
            submit_timeout_ms: config.submit_timeout_ms,
        };

        let scheduler = BatchScheduler {
            config,
            extractor: Arc::new(extractor),
            queue_rx,
            results_tx,
            ledger,
        };

        Ok((handle, scheduler, results_rx))
    }

    /// Run the dispatch loop until the queue is closed and drained.
    ///
    /// Collects segments FIFO until a full batch forms or the flush
    /// interval elapses with at least one segment pending, so the last
    /// partial batch never waits indefinitely. Ledger entries still pending
    /// when the loop exits are flushed with a failure marker, never
    /// silently dropped.
    pub async fn run(mut self) {
        let flush_interval = Duration::from_millis(self.config.flush_interval_ms);
        info!(
            batch_size = self.config.batch_size,
            queue_size = self.config.queue_size,
            "batch scheduler running"
        );

        while let Some(first) = self.queue_rx.recv().await {
            let mut batch = vec![first];
            let deadline = Instant::now() + flush_interval;

            while batch.len() < self.config.batch_size {
                match timeout_at(deadline, self.queue_rx.recv()).await {
                    Ok(Some(segment)) => batch.push(segment),
                    // Queue closed; dispatch what we have, outer loop exits
                    Ok(None) => break,
                    // Flush interval elapsed with a partial batch
                    Err(_) => break,
                }
            }

            self.dispatch(batch).await;
        }

        let cancelled = self.ledger.drain("cancelled at shutdown");
        if !cancelled.is_empty() {
            warn!(count = cancelled.len(), "flushing documents pending at shutdown");
        }
        for result in cancelled {
            if self.results_tx.send(result).await.is_err() {
                break;
            }
        }
        info!("batch scheduler stopped");
    }

    /// Dispatch one batch and distribute its outcomes into the ledger.
    async fn dispatch(&self, batch: Vec<Segment>) {
        debug!(segments = batch.len(), "dispatching batch");

        let inputs: Vec<ExtractionInput> = batch
            .iter()
            .map(|s| ExtractionInput::new(s.text.clone(), s.language.clone()))
            .collect();
        let expected = batch.len();

        let extractor = Arc::clone(&self.extractor);
        let call = tokio::task::spawn_blocking(move || {
            extractor.extract(&inputs).map_err(|e| e.to_string())
        });

        let timeout_secs = self.config.extraction_timeout_secs;
        let outcome = match timeout(Duration::from_secs(timeout_secs), call).await {
            Ok(Ok(Ok(sets))) if sets.len() == expected => Ok(sets),
            Ok(Ok(Ok(sets))) => Err(format!(
                "extractor returned {} outputs for {} inputs",
                sets.len(),
                expected
            )),
            Ok(Ok(Err(reason))) => Err(reason),
            Ok(Err(join_error)) => Err(format!("extraction task failed: {}", join_error)),
            Err(_) => Err(format!("extraction timed out after {}s", timeout_secs)),
        };

        match outcome {
            Ok(sets) => {
                for (segment, triplets) in batch.iter().zip(sets) {
                    self.finish_segment(segment, SegmentOutcome::Extracted(triplets))
                        .await;
                }
            }
            Err(reason) => {
                // Batch-level failure: every segment in the batch is marked
                // failed, but each affected document still completes
                warn!(segments = batch.len(), %reason, "batch extraction failed");
                for segment in &batch {
                    self.finish_segment(segment, SegmentOutcome::Failed(reason.clone()))
                        .await;
                }
            }
        }
    }

    async fn finish_segment(&self, segment: &Segment, outcome: SegmentOutcome) {
        if let Some(result) = self
            .ledger
            .record(&segment.document_id, segment.sequence_index, outcome)
        {
            debug!(
                doc_id = %result.doc_id,
                triplets = result.triplets.len(),
                failures = result.failures.len(),
                "document complete"
            );
            if self.results_tx.send(result).await.is_err() {
                warn!("results receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relstream_model::MockExtractor;
    use relstream_domain::Triplet;

    fn segment(doc: &str, index: usize, text: &str) -> Segment {
        Segment::new(doc, index, text, "en_XX")
    }

    fn fast_config() -> SchedulerConfig {
        SchedulerConfig {
            flush_interval_ms: 20,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_document_single_segment() {
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

        let (handle, scheduler, mut results) =
            BatchScheduler::new(fast_config(), extractor).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.register("d1", "en_XX", 1, None).await.unwrap();
        handle
            .submit(segment("d1", 0, "Apple Inc. is headquartered in Cupertino."))
            .await
            .unwrap();
        handle.close();
        // Release the handle's result sender so the stream can end
        drop(handle);

        let result = results.recv().await.unwrap();
        assert_eq!(result.doc_id, "d1");
        assert_eq!(result.num_segments, 1);
        assert_eq!(result.triplets.len(), 1);
        assert_eq!(result.triplets[0].head, "Apple Inc.");

        runner.await.unwrap();
        assert!(results.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_two_documents_two_batches() {
        // 5 + 5 segments with batch_size 8 must make exactly 2 calls:
        // one batch of 8 and one of 2
        let extractor = MockExtractor::new();
        let counter = extractor.clone();

        let (handle, scheduler, mut results) =
            BatchScheduler::new(fast_config(), extractor).unwrap();

        // Queue everything before the run loop starts so batch formation is
        // deterministic: 10 queued segments become batches of 8 and 2
        for doc in ["a", "b"] {
            handle.register(doc, "en_XX", 5, None).await.unwrap();
        }
        for doc in ["a", "b"] {
            for i in 0..5 {
                handle
                    .submit(segment(doc, i, &format!("{doc} segment {i}.")))
                    .await
                    .unwrap();
            }
        }
        handle.close();
        drop(handle);
        let runner = tokio::spawn(scheduler.run());

        let mut seen = Vec::new();
        while let Some(result) = results.recv().await {
            assert_eq!(result.num_segments, 5);
            seen.push(result.doc_id);
        }
        seen.sort();
        assert_eq!(seen, vec!["a", "b"]);

        runner.await.unwrap();
        assert_eq!(counter.call_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_failure_is_isolated() {
        // Second batch fails; the first document's result is unaffected and
        // the run does not abort
        let mut extractor = MockExtractor::new();
        extractor.add_response("first doc.", vec![Triplet::new("A", "T", "r", "B", "T")]);
        extractor.fail_on_call(2);

        let config = SchedulerConfig {
            batch_size: 1,
            flush_interval_ms: 20,
            ..Default::default()
        };
        let (handle, scheduler, mut results) = BatchScheduler::new(config, extractor).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.register("good", "en_XX", 1, None).await.unwrap();
        handle.register("bad", "en_XX", 1, None).await.unwrap();
        handle.submit(segment("good", 0, "first doc.")).await.unwrap();
        handle.submit(segment("bad", 0, "second doc.")).await.unwrap();
        handle.close();
        drop(handle);

        let mut outcomes = std::collections::HashMap::new();
        while let Some(result) = results.recv().await {
            outcomes.insert(result.doc_id.clone(), result);
        }
        runner.await.unwrap();

        assert!(outcomes["good"].is_ok());
        assert_eq!(outcomes["good"].triplets.len(), 1);
        assert!(!outcomes["bad"].is_ok());
        assert!(outcomes["bad"].triplets.is_empty());
    }

    #[tokio::test]
    async fn test_submit_after_close_fails() {
        let (handle, scheduler, _results) =
            BatchScheduler::new(fast_config(), MockExtractor::new()).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.close();
        assert!(handle.is_closed());
        assert_eq!(
            handle.submit(segment("d1", 0, "late")).await,
            Err(SchedulerError::Closed)
        );
        assert_eq!(
            handle.register("d1", "en_XX", 1, None).await,
            Err(SchedulerError::Closed)
        );

        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (handle, scheduler, _results) =
            BatchScheduler::new(fast_config(), MockExtractor::new()).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.close();
        handle.close();
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_blocks_at_capacity() {
        // A queue of 2 with a stalled consumer: the third submit must not
        // complete until the scheduler starts dequeuing
        let config = SchedulerConfig {
            batch_size: 8,
            queue_size: 2,
            flush_interval_ms: 20,
            ..Default::default()
        };
        let (handle, scheduler, mut results) =
            BatchScheduler::new(config, MockExtractor::new()).unwrap();

        handle.register("d1", "en_XX", 3, None).await.unwrap();
        handle.submit(segment("d1", 0, "one")).await.unwrap();
        handle.submit(segment("d1", 1, "two")).await.unwrap();

        let blocked = handle.submit(segment("d1", 2, "three"));
        tokio::pin!(blocked);

        // No consumer yet: the submit stays pending
        let raced = tokio::time::timeout(Duration::from_millis(50), &mut blocked).await;
        assert!(raced.is_err(), "submit should block while the queue is full");

        // Start the consumer; the blocked submit completes and the document
        // drains
        let runner = tokio::spawn(scheduler.run());
        blocked.await.unwrap();
        handle.close();

        let result = results.recv().await.unwrap();
        assert_eq!(result.num_segments, 3);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_timeout_reports_backpressure() {
        let config = SchedulerConfig {
            queue_size: 1,
            submit_timeout_ms: Some(30),
            flush_interval_ms: 20,
            ..Default::default()
        };
        let (handle, _scheduler, _results) =
            BatchScheduler::new(config, MockExtractor::new()).unwrap();

        // Scheduler never runs, so the queue stays full after one segment
        handle.submit(segment("d1", 0, "fills the queue")).await.unwrap();
        assert_eq!(
            handle.submit(segment("d1", 1, "times out")).await,
            Err(SchedulerError::SubmitTimeout(30))
        );
    }

    #[tokio::test]
    async fn test_registered_but_unsubmitted_document_flushed_at_shutdown() {
        let (handle, scheduler, mut results) =
            BatchScheduler::new(fast_config(), MockExtractor::new()).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.register("orphan", "en_XX", 2, None).await.unwrap();
        handle.submit(segment("orphan", 0, "only half arrives")).await.unwrap();
        handle.close();

        let result = results.recv().await.unwrap();
        assert_eq!(result.doc_id, "orphan");
        assert!(!result.is_ok());
        assert!(result
            .failures
            .iter()
            .any(|f| f.reason.contains("cancelled")));

        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_segment_document_emits_empty_result() {
        let (handle, scheduler, mut results) =
            BatchScheduler::new(fast_config(), MockExtractor::new()).unwrap();
        let runner = tokio::spawn(scheduler.run());

        handle.register("empty", "en_XX", 0, None).await.unwrap();
        handle.close();

        let result = results.recv().await.unwrap();
        assert_eq!(result.doc_id, "empty");
        assert_eq!(result.num_segments, 0);
        assert!(result.is_ok());

        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let config = SchedulerConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(BatchScheduler::new(config, MockExtractor::new()).is_err());
    }
}
