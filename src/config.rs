//! Execution configuration.

use crate::error::{OpsError, OpsResult};

/// Default attempt budget for concurrent replace.
pub const DEFAULT_MAX_RETRY_COUNT: u32 = 10;

/// Retry budget for the concurrent replace loop.
///
/// `max_retry_count` counts total read-transform-write attempts, so a value
/// of `1` means a single attempt and no retry.
///
/// # Examples
///
/// ```rust
/// use item_ops::config::RetryConfig;
///
/// let config = RetryConfig::new().with_max_retry_count(3);
/// assert_eq!(config.max_retry_count, 3);
/// assert!(config.validate().is_ok());
///
/// assert_eq!(RetryConfig::default().max_retry_count, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts allowed before a stale etag is reported as `ModifiedBefore`.
    pub max_retry_count: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry_count: DEFAULT_MAX_RETRY_COUNT,
        }
    }
}

impl RetryConfig {
    /// Create a configuration with the default budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of attempts.
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> OpsResult<()> {
        if self.max_retry_count == 0 {
            return Err(OpsError::invalid_configuration(
                "max_retry_count must allow at least one attempt",
            ));
        }

        Ok(())
    }
}
