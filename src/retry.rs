//! Exponential backoff for flaky network calls (LLM requests).

use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }
}

/// Run `operation`, retrying failures for which `should_retry` returns true.
///
/// Delays double after each failed attempt, capped at `config.max_delay`.
/// A failure that `should_retry` rejects is returned immediately, as is the
/// last error once `config.max_retries` retries are used up.
pub async fn with_retry_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempts = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts > config.max_retries || !should_retry(&e) {
                    return Err(e);
                }

                tracing::warn!(
                    "Request failed (attempt {}/{}): {}. Retrying in {:?}...",
                    attempts,
                    config.max_retries + 1,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig::new(max_retries, Duration::from_millis(5), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let attempts = AtomicU32::new(0);

        let result: Result<&str, &str> = with_retry_if(
            &fast_config(3),
            || {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if count < 3 { Err("timeout") } else { Ok("summary") } }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Ok("summary"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let attempts = AtomicU32::new(0);

        let result: Result<i32, &str> = with_retry_if(
            &fast_config(2),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("server error") }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Err("server error"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let attempts = AtomicU32::new(0);

        let result: Result<i32, u16> = with_retry_if(
            &fast_config(5),
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(401) }
            },
            |status| *status >= 500,
        )
        .await;

        assert_eq!(result, Err(401));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
