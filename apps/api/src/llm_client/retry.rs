//! Generic retry-with-backoff policy.
//!
//! The backoff math lives on a plain value so it can be tested without making
//! a real completion call; the caller supplies the retryable predicate.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Bounded exponential backoff: delay for attempt `n` (0-based) is
/// `min(base_delay * multiplier^n, max_delay)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self
            .base_delay
            .saturating_mul(self.multiplier.saturating_pow(attempt));
        scaled.min(self.max_delay)
    }

    /// Runs `op`, retrying up to `max_retries` times on errors accepted by
    /// `is_retryable`. Non-retryable errors propagate immediately.
    pub async fn run<T, E, Fut, Op, Pred>(&self, mut op: Op, is_retryable: Pred) -> Result<T, E>
    where
        E: std::fmt::Display,
        Fut: Future<Output = Result<T, E>>,
        Op: FnMut() -> Fut,
        Pred: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "attempt {}/{} failed ({e}), retrying after {}ms",
                        attempt + 1,
                        self.max_retries + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
