//! Relstream CLI library.
//!
//! Argument parsing, layered configuration, and the watch/process command
//! implementations that wire the pipeline crates together.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
