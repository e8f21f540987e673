//! Whole-operation retry for transient browser failures.
//!
//! Only errors classified by [`is_retriable`] are retried. A page whose
//! layout lacks a required element fails the same way on every attempt, so
//! it is returned straight away.

use std::future::Future;
use std::time::Duration;

use crate::error::{is_retriable, ScraperError};

/// Runs `operation`, retrying retriable failures up to `max_retries` times.
///
/// Before retry `n` (counting from zero) the task sleeps
/// `backoff_base_secs * 2^n` seconds. With `max_retries = 2` and a base of
/// 5 s the operation runs at most three times, pausing 5 s then 10 s.
///
/// # Errors
///
/// Returns the first non-retriable error, or the last retriable one once
/// retries are used up.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || retry >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << retry.min(62));
        tracing::warn!(
            retry,
            max_retries,
            delay_secs,
            error = %err,
            "transient browser error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        retry += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn stale_click() -> ScraperError {
        ScraperError::Driver(DriverError::Command {
            command: "click",
            reason: "stale element reference".to_owned(),
        })
    }

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ScraperError>("beer")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "beer");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_driver_errors_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(stale_click())
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
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ScraperError::Timeout {
                    url: "https://untappd.com/beer/1".to_owned(),
                    attempts: 20,
                    waited_ms: 60_000,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ScraperError::Timeout { .. })));
    }

    #[tokio::test]
    async fn missing_element_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ScraperError::MissingElement {
                    context: "beer field `abv`",
                    locator: "class `abv`".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::MissingElement { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_retries() {
        let started = tokio::time::Instant::now();
        let result = retry_with_backoff(2, 5, || async { Err::<u32, _>(stale_click()) }).await;
        assert!(result.is_err());
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(15), "waited {waited:?}");
        assert!(waited < Duration::from_secs(16), "waited {waited:?}");
    }
}
