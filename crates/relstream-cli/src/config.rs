//! Configuration management for the CLI.
//!
//! Settings come from three layers, later layers winning: built-in
//! defaults, an optional TOML file, then command-line flags and
//! `RELSTREAM_*` environment variables (handled by clap).

use crate::cli::SharedArgs;
use crate::error::{CliError, Result};
use relstream_scheduler::SchedulerConfig;
use relstream_watcher::WatcherConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Batching and queue settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Inference endpoint settings
    #[serde(default)]
    pub model: ModelSettings,

    /// Directory watch settings
    #[serde(default)]
    pub watch: WatchSettings,
}

/// Batching and queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Maximum segments per extraction call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum tokens per segment
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Backpressure threshold for pending segments
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// How long a partial batch may wait before dispatch
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Inference endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Compute device selector, passed through opaquely (-1 = CPU)
    #[serde(default = "default_device")]
    pub device: i32,

    /// Retry attempts per batch
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Directory watch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Directory scanned for incoming files
    pub input_dir: Option<PathBuf>,

    /// Where consumed files are moved; defaults to `<input_dir>/processed`
    pub archive_dir: Option<PathBuf>,

    /// Where result JSON files are written; defaults to
    /// `<input_dir>/relations`
    pub output_dir: Option<PathBuf>,

    /// File extension to match
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directory scan interval
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// File stability window before a file counts as fully written
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Config {
    /// Load configuration from a TOML file, or defaults when no file is
    /// given or present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Ok(toml::from_str(&contents)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Fold command-line overrides into the configuration.
    pub fn apply(&mut self, args: &SharedArgs) {
        if let Some(batch_size) = args.batch_size {
            self.pipeline.batch_size = batch_size;
        }
        if let Some(max_length) = args.max_length {
            self.pipeline.max_length = max_length;
        }
        if let Some(queue_size) = args.queue_size {
            self.pipeline.queue_size = queue_size;
        }
        if let Some(device) = args.device {
            self.model.device = device;
        }
        if let Some(endpoint) = &args.endpoint {
            self.model.endpoint = endpoint.clone();
        }
    }

    /// Scheduler configuration from the pipeline section.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            batch_size: self.pipeline.batch_size,
            queue_size: self.pipeline.queue_size,
            flush_interval_ms: self.pipeline.flush_interval_ms,
            ..Default::default()
        }
    }

    /// Watcher configuration from the watch section.
    ///
    /// # Errors
    ///
    /// Returns an error when no input directory is configured.
    pub fn watcher_config(&self) -> Result<WatcherConfig> {
        let input_dir = self
            .watch
            .input_dir
            .clone()
            .ok_or_else(|| CliError::Config("no input directory configured".to_string()))?;

        let mut config = WatcherConfig::new(&input_dir, self.archive_dir());
        config.extension = self.watch.extension.clone();
        config.poll_interval_ms = self.watch.poll_interval_ms;
        config.debounce_ms = self.watch.debounce_ms;
        Ok(config)
    }

    /// Effective archive directory.
    pub fn archive_dir(&self) -> PathBuf {
        match (&self.watch.archive_dir, &self.watch.input_dir) {
            (Some(archive), _) => archive.clone(),
            (None, Some(input)) => input.join("processed"),
            (None, None) => PathBuf::from("processed"),
        }
    }

    /// Effective output directory.
    pub fn output_dir(&self) -> PathBuf {
        match (&self.watch.output_dir, &self.watch.input_dir) {
            (Some(output), _) => output.clone(),
            (None, Some(input)) => input.join("relations"),
            (None, None) => PathBuf::from("relations"),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_length: default_max_length(),
            queue_size: default_queue_size(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            input_dir: None,
            archive_dir: None,
            output_dir: None,
            extension: default_extension(),
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            device: default_device(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_batch_size() -> usize {
    8
}

fn default_max_length() -> usize {
    1024
}

fn default_queue_size() -> usize {
    1000
}

fn default_flush_interval_ms() -> u64 {
    200
}

fn default_endpoint() -> String {
    relstream_model::remote::DEFAULT_ENDPOINT.to_string()
}

fn default_device() -> i32 {
    -1
}

fn default_max_retries() -> u32 {
    3
}

fn default_extension() -> String {
    "txt".to_string()
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_debounce_ms() -> u64 {
    500
}
