//! Relstream Batch Scheduler
//!
//! The core of the pipeline: a bounded queue between segment arrival and
//! extraction, batch formation by size or time threshold, dispatch to a
//! pluggable extractor, and reassembly of per-document results.
//!
//! # Contract
//!
//! - [`SchedulerHandle::submit`] suspends once `queue_size` segments are
//!   pending; producers stall rather than drop or buffer unboundedly.
//! - [`BatchScheduler::run`] forms FIFO batches of at most `batch_size`,
//!   flushing a partial batch after `flush_interval_ms` so the tail of a
//!   stream never waits indefinitely.
//! - A document's [`relstream_domain::DocumentResult`] is emitted exactly
//!   once, only after every one of its segments has resolved, in completion
//!   order across documents.
//! - A batch-level extraction failure marks that batch's segments failed
//!   and never disturbs unrelated documents.
//! - [`SchedulerHandle::close`] drains the queue, flushes the final partial
//!   batch, and flushes still-pending documents with a failure marker.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use ledger::{PendingLedger, SegmentOutcome};
pub use scheduler::{BatchScheduler, SchedulerHandle};
