//! Fixed-count retry for provider requests
//!
//! Attempts are bounded by a small fixed count with a constant pause between
//! them. Only errors reported as retryable by
//! [`MarketError::is_retryable`](crate::error::MarketError::is_retryable) are tried again.

use crate::config::MarketConfig;
use crate::error::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&MarketConfig::default())
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy matching the configured retry budget
    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.max_attempts(), config.retry_delay)
    }

    /// Create a policy with no retries
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Execute an async operation with retry logic
    ///
    /// Returns the first success, the first non-retryable error, or the last
    /// error once the attempts are used up.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!("Operation '{operation_name}' succeeded on attempt {attempt}");
                    }
                    return Ok(result);
                }
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    debug!(
                        "Attempt {attempt}/{} for '{operation_name}' failed: {e}",
                        self.max_attempts
                    );
                    attempt += 1;
                    if !self.delay.is_zero() {
                        sleep(self.delay).await;
                    }
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!("Operation '{operation_name}' failed after {attempt} attempts: {e}");
                    }
                    return Err(e);
                }
            }
        }
    }
}
