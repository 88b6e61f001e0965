//! Scheduler configuration

use crate::error::SchedulerError;

/// Configuration for the batch scheduler.
///
/// # Examples
///
/// ```
/// use relstream_scheduler::SchedulerConfig;
///
/// let config = SchedulerConfig::default();
/// assert_eq!(config.batch_size, 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Maximum segments per extraction call
    pub batch_size: usize,

    /// Queue capacity; `submit` suspends once this many segments are pending
    pub queue_size: usize,

    /// How long a partial batch may wait for more segments before dispatch
    pub flush_interval_ms: u64,

    /// Hard ceiling on one extraction call
    pub extraction_timeout_secs: u64,

    /// Optional bound on how long `submit` may block on a full queue.
    ///
    /// `None` means block indefinitely; the scheduler never drops segments
    /// on its own.
    pub submit_timeout_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 8,
            queue_size: 1000,
            flush_interval_ms: 200,
            extraction_timeout_secs: 120,
            submit_timeout_ms: None,
        }
    }
}

impl SchedulerConfig {
    /// Preset tuned for interactive use: small batches, quick flushes.
    pub fn low_latency() -> Self {
        Self {
            batch_size: 2,
            flush_interval_ms: 50,
            ..Self::default()
        }
    }

    /// Preset tuned for bulk runs: larger batches, patient flushes.
    pub fn high_throughput() -> Self {
        Self {
            batch_size: 32,
            flush_interval_ms: 1000,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` for zero sizes or intervals.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.batch_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.queue_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "queue_size must be greater than 0".to_string(),
            ));
        }
        if self.flush_interval_ms == 0 {
            return Err(SchedulerError::InvalidConfig(
                "flush_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.extraction_timeout_secs == 0 {
            return Err(SchedulerError::InvalidConfig(
                "extraction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.submit_timeout_ms == Some(0) {
            return Err(SchedulerError::InvalidConfig(
                "submit_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SchedulerConfig::default().validate().is_ok());
        assert!(SchedulerConfig::low_latency().validate().is_ok());
        assert!(SchedulerConfig::high_throughput().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = SchedulerConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_queue_size_rejected() {
        let config = SchedulerConfig {
            queue_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_submit_timeout_rejected() {
        let config = SchedulerConfig {
            submit_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
