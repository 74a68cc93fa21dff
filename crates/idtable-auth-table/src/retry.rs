//! Bounded retry for backend calls.
//!
//! Retries are blind: every failure is retried while both the attempt budget
//! and the elapsed-time budget allow another try. Data-integrity failures never
//! reach this layer because decoding happens after the backend call returns.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use crate::config::RetryConfig;

/// Retry-until-success-or-exhaustion policy.
///
/// # Default Values
///
/// - `max_attempts`: 3
/// - `max_elapsed`: 30 seconds
/// - `interval`: 200ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    max_elapsed: Duration,
    interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_elapsed: Duration::from_secs(30),
            interval: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` below one is treated as one.
    #[must_use]
    pub fn new(max_attempts: u32, max_elapsed: Duration, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            max_elapsed,
            interval,
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            max_elapsed: Duration::ZERO,
            interval: Duration::ZERO,
        }
    }

    /// Builds the policy for a table, honouring its `enabled` switch.
    #[must_use]
    pub fn from_config(config: &RetryConfig, enabled: bool) -> Self {
        if enabled {
            Self::new(config.max_attempts, config.max_elapsed, config.interval)
        } else {
            Self::single_attempt()
        }
    }

    /// Maximum number of attempts.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Total time budget across attempts.
    #[must_use]
    pub fn max_elapsed(&self) -> Duration {
        self.max_elapsed
    }

    /// Delay between attempts.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` if the policy can retry at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }

    /// Runs `operation` until it succeeds or the budgets are exhausted.
    ///
    /// Another attempt is made only if fewer than `max_attempts` attempts have
    /// run and waiting `interval` would not exceed `max_elapsed`. Otherwise the
    /// last failure is returned.
    pub async fn run<F, Fut, T, E>(&self, operation_name: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let started = Instant::now();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(
                            operation = operation_name,
                            attempt,
                            "Operation succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(err) => {
                    let elapsed = started.elapsed();
                    if attempt >= self.max_attempts || elapsed + self.interval > self.max_elapsed {
                        if self.is_enabled() {
                            tracing::warn!(
                                operation = operation_name,
                                attempt,
                                elapsed_ms = elapsed.as_millis() as u64,
                                error = %err,
                                "Retry budget exhausted"
                            );
                        }
                        return Err(err);
                    }

                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Operation failed, retrying in {:?}",
                        self.interval
                    );
                    sleep(self.interval).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn failing_until(
        calls: &Arc<AtomicU32>,
        succeed_on: u32,
    ) -> impl FnMut() -> std::future::Ready<Result<u32, String>> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= succeed_on {
                Ok(n)
            } else {
                Err(format!("attempt {n} failed"))
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run("retrieve", failing_until(&calls, 3))
            .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_budget_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = RetryPolicy::default()
            .run("retrieve", failing_until(&calls, 10))
            .await;

        assert_eq!(result, Err("attempt 3 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_budget_stops_early() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_millis(400));

        let result = policy.run("query", failing_until(&calls, 100)).await;

        assert!(result.is_err());
        // attempts at 0ms, 400ms, 800ms; a fourth would start at 1200ms
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_never_retries() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = RetryPolicy::single_attempt()
            .run("delete", failing_until(&calls, 2))
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!RetryPolicy::single_attempt().is_enabled());
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = RetryConfig::default();
        assert_eq!(RetryPolicy::from_config(&config, true), RetryPolicy::default());
        assert_eq!(
            RetryPolicy::from_config(&config, false),
            RetryPolicy::single_attempt()
        );
    }
}
