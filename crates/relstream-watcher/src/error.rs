//! Error types for the directory watcher

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during watcher operations
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Invalid watcher configuration, fatal at startup
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// An archive move would have required overwriting existing data
    #[error("Archive destination exhausted for {0}")]
    ArchiveCollision(PathBuf),

    /// A copied file did not match its source before deletion
    #[error("Archive copy verification failed for {0}")]
    CopyMismatch(PathBuf),
}

impl WatcherError {
    /// Wrap an I/O error with the path it concerned.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
