//! Bounded retry with a fixed wait between attempts.
//!
//! Both external calls in the pipeline (metadata resolution and the media
//! download) retry on transient failure with a flat delay: no backoff,
//! no jitter. The policy is a plain value injected into each component so
//! tests can shrink the delay to milliseconds.

use crate::core::error::AppError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Retry-related errors.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// All attempts exhausted
    #[error("All {max_attempts} attempts exhausted")]
    AttemptsExhausted { max_attempts: u32, last_error: E },
}

/// Fixed-interval retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (first try included)
    pub max_attempts: u32,
    /// Wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Policy for the metadata API: 3 attempts, 5s apart.
    pub fn resolver() -> Self {
        Self::default()
    }

    /// Policy for media downloads: initial attempt plus a retry budget
    /// of 5, 5s apart.
    pub fn downloader() -> Self {
        Self {
            max_attempts: 6,
            delay: Duration::from_secs(5),
        }
    }

    /// Sets the total attempt count.
    #[must_use]
    pub fn max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Sets the wait between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Determines if an error is worth another attempt.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for reqwest::Error {
    fn is_retryable(&self) -> bool {
        // Decode failures are a server-contract problem, not a transient one.
        self.is_timeout() || self.is_connect() || self.is_request() || self.is_body()
    }
}

impl Retryable for std::io::Error {
    fn is_retryable(&self) -> bool {
        use std::io::ErrorKind;
        matches!(
            self.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::TimedOut
                | ErrorKind::Interrupted
                | ErrorKind::WouldBlock
        )
    }
}

impl Retryable for AppError {
    fn is_retryable(&self) -> bool {
        match self {
            AppError::Http(e) => e.is_retryable(),
            AppError::HttpStatus(_) => true,
            AppError::Io(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The final result (success or last error)
    pub result: Result<T, RetryError<E>>,
    /// Number of attempts made
    pub attempts: u32,
}

impl<T, E> RetryResult<T, E> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.result, Err(RetryError::AttemptsExhausted { .. }))
    }
}

/// Executes an async operation under the given policy.
///
/// Non-retryable errors short-circuit; the result still reports them as
/// exhausted so callers have a single failure path.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Debug,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts,
                };
            }
            Err(e) if attempts < policy.max_attempts && e.is_retryable() => {
                log::warn!(
                    "Attempt {}/{} failed (retrying in {:?}): {:?}",
                    attempts,
                    policy.max_attempts,
                    policy.delay,
                    e
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => {
                return RetryResult {
                    result: Err(RetryError::AttemptsExhausted {
                        max_attempts: policy.max_attempts,
                        last_error: e,
                    }),
                    attempts,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestError(bool); // bool = is_retryable

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "TestError(retryable={})", self.0)
        }
    }

    impl std::error::Error for TestError {}

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_try() {
        let result = retry(&quick(3), || async { Ok::<_, TestError>(42) }).await;

        assert!(result.is_ok());
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry(&quick(3), || {
            let counter = counter_clone.clone();
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(TestError(true))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let result = retry(&quick(3), || async { Err::<i32, _>(TestError(true)) }).await;

        assert!(result.is_exhausted());
        assert_eq!(result.attempts, 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry(&quick(3), || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<i32, _>(TestError(false))
            }
        })
        .await;

        assert!(result.is_exhausted());
        assert_eq!(result.attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_policies() {
        let resolver = RetryPolicy::resolver();
        assert_eq!(resolver.max_attempts, 3);
        assert_eq!(resolver.delay, Duration::from_secs(5));

        let downloader = RetryPolicy::downloader();
        assert_eq!(downloader.max_attempts, 6);
        assert_eq!(downloader.delay, Duration::from_secs(5));
    }
}
