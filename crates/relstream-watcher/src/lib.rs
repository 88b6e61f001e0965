//! Relstream Directory Watcher
//!
//! Turns a watched filesystem directory into a document stream with
//! at-least-once, no-duplicate-while-stable delivery.
//!
//! # Behavior
//!
//! - The input directory is scanned non-recursively at a fixed poll
//!   interval for files with the configured extension.
//! - A file is emitted only after its size and mtime have held still for
//!   the debounce window, and at most once while it remains in place.
//! - Files that are not valid UTF-8 are reported as
//!   [`SourceEvent::Corrupt`] and moved to an `errored/` subpath of the
//!   archive so the input directory never accumulates unprocessable files.
//! - The [`archive`] module moves consumed files into the archive without
//!   ever overwriting: rename where possible, copy-verify-delete across
//!   filesystems, deterministic `-N` suffixes on name collisions.

#![warn(missing_docs)]

pub mod archive;
pub mod config;
pub mod error;
pub mod watcher;

pub use archive::archive_file;
pub use config::WatcherConfig;
pub use error::WatcherError;
pub use watcher::{DirectoryWatcher, SourceEvent, WatcherHandle};
