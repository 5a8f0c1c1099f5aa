//! Bounded retry with exponential backoff.
//!
//! Wraps any fallible async attempt: transient failures are retried up to the
//! configured attempt count, permanent failures short-circuit immediately.
//! The delay before retry `k+1` is `base_delay * 2^(k-1)`, so a 1s base gives
//! the 1s, 2s, 4s ladder.

use crate::errors::{FetchError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Reusable retry wrapper
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy that runs an attempt at most `attempts` times
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// Delay inserted after failed attempt `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts are exhausted
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    warn!("attempt {}/{} failed: {}", attempt, self.attempts, e);
                    if attempt < self.attempts {
                        sleep(self.backoff_delay(attempt)).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Transport {
            details: "retry attempts exhausted".to_string(),
        }))
    }
}
