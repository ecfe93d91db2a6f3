//! Bounded retry for storefront calls.
//!
//! One helper serves both failure classes the storefront produces: throttling
//! (HTTP 429 or a `THROTTLED` GraphQL error) and transport failures
//! (timeouts, refused connections, 5xx). The caller supplies the predicate
//! that decides what is retryable and the backoff schedule; everything else is
//! returned on the first occurrence.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use pimsync_core::AppConfig;

use crate::error::StorefrontError;

/// Attempt budget and linear backoff steps for storefront calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait before retry `n` after a throttle is `n * throttle_step`.
    pub throttle_step: Duration,
    /// Wait before retry `n` after a transport failure is `n * transport_step`.
    pub transport_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            throttle_step: Duration::from_secs(5),
            transport_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            throttle_step: Duration::from_secs(config.throttle_backoff_secs),
            transport_step: Duration::from_secs(config.transport_backoff_secs),
        }
    }

    /// Policy with no waiting between attempts.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            throttle_step: Duration::ZERO,
            transport_step: Duration::ZERO,
        }
    }

    /// Backoff after failed attempt `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32, err: &StorefrontError) -> Duration {
        let step = if err.is_throttled() {
            self.throttle_step
        } else {
            self.transport_step
        };
        step.saturating_mul(attempt)
    }

    #[must_use]
    pub fn is_retryable(err: &StorefrontError) -> bool {
        err.is_throttled() || err.is_transport()
    }
}

/// Runs `operation` up to `max_attempts` times.
///
/// `operation` receives the 1-based attempt number. A retryable error sleeps
/// for `backoff(attempt, &err)` and tries again; once the budget is spent the
/// last error is returned. Non-retryable errors are returned immediately.
/// A budget of zero still makes one attempt.
pub(crate) async fn retry_bounded<T, E, F, Fut, P, B>(
    max_attempts: u32,
    is_retryable: P,
    backoff: B,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    B: Fn(u32, &E) -> Duration,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err) || attempt >= max_attempts {
            return Err(err);
        }

        let delay = backoff(attempt, &err);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_secs = delay.as_secs(),
            error = %err,
            "storefront call failed, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// [`retry_bounded`] driven by a [`RetryPolicy`].
pub(crate) async fn retry_with_policy<T, F, Fut>(
    policy: RetryPolicy,
    operation: F,
) -> Result<T, StorefrontError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, StorefrontError>>,
{
    retry_bounded(
        policy.max_attempts,
        RetryPolicy::is_retryable,
        |attempt, err| policy.backoff(attempt, err),
        operation,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn throttled() -> StorefrontError {
        StorefrontError::Throttled {
            context: "test".to_owned(),
        }
    }

    fn server_error() -> StorefrontError {
        StorefrontError::UnexpectedStatus {
            status: 502,
            context: "test".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_policy(RetryPolicy::immediate(3), |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, StorefrontError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_throttle_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_policy(RetryPolicy::immediate(3), |_| {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(throttled())
                } else {
                    Ok::<u32, StorefrontError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_after_budget_and_returns_last_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_policy(RetryPolicy::immediate(3), |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(server_error())
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(StorefrontError::UnexpectedStatus { status: 502, .. })
        ));
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_is_not_retried() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_policy(RetryPolicy::immediate(3), |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(StorefrontError::Unauthorized {
                    context: "test".to_owned(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(StorefrontError::Unauthorized { .. })));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_budget_still_makes_one_attempt() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let _ = retry_with_policy(RetryPolicy::immediate(0), |_| {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(throttled())
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn operation_sees_attempt_numbers() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _ = retry_bounded(
            3,
            |_: &String| true,
            |_, _| Duration::ZERO,
            |attempt| {
                let s = Arc::clone(&s);
                async move {
                    s.lock().unwrap().push(attempt);
                    Err::<(), String>("nope".to_owned())
                }
            },
        )
        .await;
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn backoff_is_linear_per_failure_class() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1, &throttled()), Duration::from_secs(5));
        assert_eq!(policy.backoff(2, &throttled()), Duration::from_secs(10));
        assert_eq!(policy.backoff(1, &server_error()), Duration::from_secs(2));
        assert_eq!(policy.backoff(2, &server_error()), Duration::from_secs(4));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let not_found = StorefrontError::UnexpectedStatus {
            status: 404,
            context: "test".to_owned(),
        };
        assert!(!RetryPolicy::is_retryable(&not_found));
        assert!(RetryPolicy::is_retryable(&server_error()));
        assert!(RetryPolicy::is_retryable(&throttled()));
    }
}
