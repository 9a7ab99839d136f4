//! Bounded retry with an injected backoff schedule.

use std::future::Future;

use crate::error::UploadError;
use crate::types::BackoffSettings;

/// Run `operation` up to `max_attempts` times, sleeping per the backoff
/// schedule between attempts.
///
/// Only errors classified retryable by [`UploadError::is_retryable`] are
/// retried; any other error is returned immediately. When the attempt
/// budget runs out the last (retryable) error is returned - callers decide
/// how exhaustion escalates.
///
/// The closure receives the 0-based attempt number.
pub async fn retry_with_backoff<T, F, Fut>(
    backoff: &BackoffSettings,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, UploadError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, UploadError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt + 1 < max_attempts => {
                let delay = backoff.delay_for_attempt(attempt);
                log::debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_backoff() -> BackoffSettings {
        BackoffSettings {
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_backoff(), 5, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(UploadError::transient("flaky"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&fast_backoff(), 5, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(UploadError::contract("bad shape")) }
        })
        .await;
        assert!(matches!(result, Err(UploadError::Contract { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempt_budget_is_exhausted() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&fast_backoff(), 3, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(UploadError::transient("still down")) }
        })
        .await;
        assert!(matches!(result, Err(UploadError::Network { retryable: true, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempt_numbers_are_zero_based() {
        let seen = std::sync::Mutex::new(Vec::new());
        let _ = retry_with_backoff(&fast_backoff(), 3, |attempt| {
            seen.lock().unwrap().push(attempt);
            async { Err::<(), _>(UploadError::transient("down")) }
        })
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }
}
