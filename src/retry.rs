//! Retry Policy Module
//!
//! Bounded exponential-backoff retries around a single upstream call.
//! Rate-limit errors abort immediately: retrying into an active limit only
//! burns another slot.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

// == Retry Config ==
/// Retry parameters for one call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (`max_retries + 1` attempts in total)
    pub max_retries: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Ceiling applied to every backoff delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryConfig {
    // == Backoff Delay ==
    /// Delay to wait after the failed attempt number `attempt` (0-based).
    ///
    /// `min(initial_delay * 2^attempt, max_delay)`, saturating so large
    /// attempt numbers stay at the ceiling.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

// == With Retry ==
/// Runs `call` until it succeeds, fails with a rate-limit error, or the
/// attempt budget is spent. Returns the last error on exhaustion.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() => return Err(err),
            Err(err) if attempt >= config.max_retries => return Err(err),
            Err(err) => {
                let delay = config.backoff_delay(attempt);
                warn!(
                    "Upstream request failed ({}), retrying in {}ms (attempt {}/{})",
                    err,
                    delay.as_millis(),
                    attempt + 1,
                    config.max_retries
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
