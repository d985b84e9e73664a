//! Bounded retry for operations that fail transiently.
//!
//! Network-bound subprocess calls (download, audio extraction) are wrapped in
//! an explicit policy rather than retrying inline, so the policy can be tuned
//! and tested independently of the operation it wraps.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// A bounded retry policy with fixed or exponentially growing delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff: f64,
}

impl RetryPolicy {
    /// Create a policy with a fixed delay between attempts.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            backoff: 1.0,
        }
    }

    /// Set the delay multiplier applied after each failed attempt.
    pub fn with_backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run an operation, retrying on failure until attempts are exhausted.
    ///
    /// The last error is returned once all attempts fail.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut current_delay = self.delay;

        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt == self.max_attempts => {
                    warn!("{} failed after {} attempts: {}", label, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}. Retrying in {:?}...",
                        attempt, self.max_attempts, label, e, current_delay
                    );
                    tokio::time::sleep(current_delay).await;
                    current_delay = current_delay.mul_f64(self.backoff);
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkueError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_first_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, SkueError>(42) }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result = policy
            .run("op", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(SkueError::ToolFailed("flaky".into()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let calls = AtomicU32::new(0);

        let result: crate::Result<()> = policy
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SkueError::ToolFailed("down".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_backoff_grows_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(2)).with_backoff(2.0);
        assert_eq!(policy.backoff, 2.0);

        // Delay growth is internal; we only assert the policy still converges.
        let calls = AtomicU32::new(0);
        let result: crate::Result<()> = policy
            .run("op", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(SkueError::ToolFailed("down".into())) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
