//! Relstream Pipeline Orchestrator
//!
//! Composes the pipeline stages into one runnable flow:
//!
//! ```text
//! Document Source → Segment Engine → Batch Scheduler → results
//!                                                        ├─ JSON sink
//!                                                        ├─ archive move
//!                                                        └─ forward channel
//! ```
//!
//! The source is either the directory watcher (`relstream-watcher`) or an
//! in-memory producer ([`memory_source`]); the orchestrator is agnostic.
//! Shutdown flows forward: the source ends, the scheduler is closed and
//! drained, the results stream ends, and [`Pipeline::run`] returns a
//! [`PipelineSummary`]. Every document reaches exactly one terminal outcome
//! and every source file is archived exactly once, regardless of which
//! stage failed.

#![warn(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod sink;

pub use error::PipelineError;
pub use pipeline::{memory_source, Pipeline, PipelineSummary};
pub use sink::ResultSink;

#[cfg(test)]
mod tests;
