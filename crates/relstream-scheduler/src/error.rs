//! Error types for the batch scheduler

use thiserror::Error;

/// Errors that can occur during scheduler operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// Invalid scheduler configuration, fatal at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `submit` or `register` called after `close`
    #[error("Scheduler is closed")]
    Closed,

    /// Bounded-wait backpressure exceeded; the segment was not enqueued
    #[error("Submit timed out after {0}ms with the queue full")]
    SubmitTimeout(u64),
}
