//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Relstream - stream documents through a relation-extraction model.
#[derive(Debug, Parser)]
#[command(name = "relstream")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "RELSTREAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Watch a directory and process files as they arrive
    Watch(WatchArgs),

    /// Process files or literal text once and exit
    Process(ProcessArgs),
}

/// Arguments for the watch command.
#[derive(Debug, Parser)]
pub struct WatchArgs {
    /// Directory to watch for incoming files
    #[arg(short, long, env = "RELSTREAM_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Where consumed files are moved
    #[arg(long, env = "RELSTREAM_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Where result JSON files are written
    #[arg(short, long, env = "RELSTREAM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// File extension to match, without the leading dot
    #[arg(long)]
    pub extension: Option<String>,

    /// File stability window in milliseconds
    #[arg(long, env = "RELSTREAM_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    #[command(flatten)]
    pub shared: SharedArgs,
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Files to process
    pub files: Vec<PathBuf>,

    /// Literal text to process instead of files
    #[arg(short, long, conflicts_with = "files")]
    pub text: Option<String>,

    /// Where result JSON files are written; results print to stdout when
    /// omitted
    #[arg(short, long, env = "RELSTREAM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Force a language instead of detecting one per document
    #[arg(short, long)]
    pub language: Option<String>,

    #[command(flatten)]
    pub shared: SharedArgs,
}

/// Options shared by every command.
#[derive(Debug, Args)]
pub struct SharedArgs {
    /// Maximum segments per extraction call
    #[arg(long, env = "RELSTREAM_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Maximum tokens per segment
    #[arg(long, env = "RELSTREAM_MAX_LENGTH")]
    pub max_length: Option<usize>,

    /// Backpressure threshold for pending segments
    #[arg(long, env = "RELSTREAM_QUEUE_SIZE")]
    pub queue_size: Option<usize>,

    /// Compute device selector passed to the model (-1 = CPU)
    #[arg(long, env = "RELSTREAM_DEVICE")]
    pub device: Option<i32>,

    /// Inference endpoint URL
    #[arg(long, env = "RELSTREAM_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use the deterministic mock extractor instead of a model endpoint
    #[arg(long)]
    pub mock: bool,
}
