//! Retry with exponential back-off and jitter for the HTTP lookups.
//!
//! The coordinator never retries; transient failures are absorbed here, inside
//! the collaborator, before a lane sees the error.

use std::future::Future;
use std::time::Duration;

use crate::error::{LookupError, RETRYABLE_UPSTREAM_CODES};

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, and upstream
/// quota/rate/timeout codes.
///
/// **Not retriable:** other upstream refusals, malformed bodies, bad URLs.
pub(crate) fn is_retriable(err: &LookupError) -> bool {
    match err {
        LookupError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LookupError::Upstream { code, .. } => RETRYABLE_UPSTREAM_CODES.contains(&code.as_str()),
        LookupError::Deserialize { .. } | LookupError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// With the default `backoff_base_ms = 500`:
///
/// | Retry | Sleep before it        |
/// |-------|------------------------|
/// | 1     | 500 ms ± 25 % jitter   |
/// | 2     | 1 000 ms ± 25 % jitter |
/// | 3     | 2 000 ms ± 25 % jitter |
///
/// Delay is capped at 30 s. Non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LookupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LookupError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient lookup error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> LookupError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        LookupError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn quota_codes_are_retriable() {
        assert!(is_retriable(&LookupError::upstream("QUOTA_EXCEEDED", "slow down")));
        assert!(is_retriable(&LookupError::upstream("TIMEOUT", "upstream timeout")));
    }

    #[test]
    fn other_upstream_codes_are_not_retriable() {
        assert!(!is_retriable(&LookupError::upstream("INVALID_REQUEST", "bad query")));
    }

    #[test]
    fn deserialize_error_is_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, LookupError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_quota_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(LookupError::upstream("QUOTA_EXCEEDED", "try later"))
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
                Err::<u32, _>(LookupError::upstream("RATE_LIMITED", "busy"))
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(LookupError::Upstream { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_terminal_upstream_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(LookupError::upstream("INVALID_REQUEST", "bad"))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "terminal errors must not be retried");
        assert!(result.is_err());
    }
}
