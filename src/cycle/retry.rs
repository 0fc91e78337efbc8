//! Retry policy for transient check failures

use std::time::Duration;

use crate::config::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};

/// Bounded retry with exponential backoff.
///
/// `attempts` counts the first try: a policy with three attempts fetches at
/// most three times per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy; at least one attempt is always made.
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Delay to sleep after the `failed_attempt`-th failure (1-based).
    /// Doubles per failure: base, 2x, 4x, capped to avoid overflow.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.backoff * 2u32.saturating_pow(exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRY_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        )
    }
}
