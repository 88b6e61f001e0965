//! Error types for the pipeline

use relstream_scheduler::SchedulerError;
use relstream_watcher::WatcherError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Scheduler-level failure, usually misconfiguration at startup
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Watcher-level failure
    #[error("Watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Result could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An orchestration task exited abnormally
    #[error("Pipeline task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Wrap an I/O error with the path it concerned.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
