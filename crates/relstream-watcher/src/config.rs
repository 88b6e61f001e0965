//! Watcher configuration

use crate::error::WatcherError;
use std::path::PathBuf;

/// Configuration for the directory watcher.
///
/// # Examples
///
/// ```
/// use relstream_watcher::WatcherConfig;
///
/// let config = WatcherConfig::new("/data/input", "/data/archive");
/// assert_eq!(config.extension, "txt");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Directory scanned for incoming files (non-recursive)
    pub input_dir: PathBuf,

    /// Directory consumed files are moved into
    pub archive_dir: PathBuf,

    /// File extension to match, without the leading dot
    pub extension: String,

    /// How often the input directory is scanned
    pub poll_interval_ms: u64,

    /// How long a file's size and mtime must hold still before it is
    /// treated as fully written
    pub debounce_ms: u64,

    /// Capacity of the emitted event channel
    pub channel_capacity: usize,
}

impl WatcherConfig {
    /// Create a configuration with default intervals.
    pub fn new(input_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            archive_dir: archive_dir.into(),
            extension: "txt".to_string(),
            poll_interval_ms: 250,
            debounce_ms: 500,
            channel_capacity: 64,
        }
    }

    /// Subdirectory of the archive for files that could not be decoded.
    pub fn errored_dir(&self) -> PathBuf {
        self.archive_dir.join("errored")
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `WatcherError::InvalidConfig` for empty paths or zero
    /// intervals. Directory existence is checked at spawn time, not here;
    /// the archive directory is created on demand.
    pub fn validate(&self) -> Result<(), WatcherError> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(WatcherError::InvalidConfig(
                "input_dir must not be empty".to_string(),
            ));
        }
        if self.archive_dir.as_os_str().is_empty() {
            return Err(WatcherError::InvalidConfig(
                "archive_dir must not be empty".to_string(),
            ));
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            return Err(WatcherError::InvalidConfig(
                "extension must be non-empty and given without the leading dot".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(WatcherError::InvalidConfig(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(WatcherError::InvalidConfig(
                "debounce_ms must be greater than 0".to_string(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(WatcherError::InvalidConfig(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WatcherConfig::new("/in", "/archive");
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.errored_dir(), PathBuf::from("/archive/errored"));
    }

    #[test]
    fn test_empty_input_dir_rejected() {
        let config = WatcherConfig::new("", "/archive");
        assert!(matches!(
            config.validate(),
            Err(WatcherError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dotted_extension_rejected() {
        let mut config = WatcherConfig::new("/in", "/archive");
        config.extension = ".txt".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_debounce_rejected() {
        let mut config = WatcherConfig::new("/in", "/archive");
        config.debounce_ms = 0;
        assert!(config.validate().is_err());
    }
}
