//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scheduler error
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] relstream_scheduler::SchedulerError),

    /// Watcher error
    #[error("Watcher error: {0}")]
    Watcher(#[from] relstream_watcher::WatcherError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] relstream_pipeline::PipelineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A background task exited abnormally
    #[error("Runtime error: {0}")]
    Runtime(String),
}
