//! Retry driver for outbound LLM calls.
//!
//! One logical call either succeeds or exhausts its attempt budget. Two
//! backoff policies, chosen by error kind:
//!
//! - rate-limit signals get the limiter's exponential-with-jitter treatment,
//!   because spacing is the cure; a provider-supplied `Retry-After` stretches
//!   the sleep further when it exceeds the adaptive delay;
//! - other transient failures get a gentler capped linear sleep
//!   (`min(5 * attempt, 30)` seconds), because waiting longer does not
//!   necessarily help and persistent errors should surface quickly.
//!
//! Unrecoverable errors (malformed model output, unusable input) are returned
//! immediately without consuming further attempts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::errors::AnalyzerError;
use crate::limiter::RateLimiter;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Cap for the linear backoff applied to non-rate-limit failures.
const LINEAR_BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Wraps an async operation with bounded retries, consulting the shared
/// [`RateLimiter`] before every attempt.
#[derive(Clone)]
pub struct Retrier {
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
}

impl Retrier {
    pub fn new(limiter: Arc<RateLimiter>, max_attempts: u32) -> Self {
        Self {
            limiter,
            // A zero budget would turn every call into an instant failure.
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Drives `op` to success or `RetriesExhausted`.
    ///
    /// Every attempt is gated by `limiter.wait()`, and every outcome is fed
    /// back into the limiter so the adaptive delay tracks the real call
    /// cadence.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T, AnalyzerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnalyzerError>>,
    {
        let mut last_error: Option<AnalyzerError> = None;

        for attempt in 1..=self.max_attempts {
            self.limiter.wait().await;

            match op().await {
                Ok(value) => {
                    self.limiter.on_success().await;
                    return Ok(value);
                }
                Err(err) if err.is_unrecoverable() => return Err(err),
                Err(err) if err.is_rate_limit() => {
                    let hint = match &err {
                        AnalyzerError::RateLimited { retry_after, .. } => *retry_after,
                        _ => None,
                    };
                    let adaptive = self.limiter.on_failure().await;
                    // A provider-supplied Retry-After is authoritative when it
                    // is longer than the adaptive delay.
                    let delay = hint.map_or(adaptive, |ra| adaptive.max(ra));
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        retry_after_ms = hint.map(|d| d.as_millis() as u64),
                        "rate limited, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(err);
                }
                Err(err) => {
                    let delay =
                        Duration::from_secs(u64::from(5 * attempt)).min(LINEAR_BACKOFF_CAP);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient API error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(err);
                }
            }
        }

        Err(AnalyzerError::RetriesExhausted {
            attempts: self.max_attempts,
            source: Box::new(last_error.unwrap_or(AnalyzerError::EmptyContent)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::limiter::RateLimiterConfig;

    fn retrier(max_attempts: u32) -> Retrier {
        Retrier::new(Arc::new(RateLimiter::default()), max_attempts)
    }

    fn rate_limited() -> AnalyzerError {
        AnalyzerError::RateLimited {
            status: 429,
            retry_after: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_calls_once() {
        let calls = AtomicU32::new(0);
        let result = retrier(5)
            .call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AnalyzerError>(42) }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_k_rate_limits_then_success_invokes_k_plus_one_times() {
        let k = 3;
        let calls = AtomicU32::new(0);
        let result = retrier(5)
            .call(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < k {
                        Err(rate_limited())
                    } else {
                        Ok("parsed")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "parsed");
        assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_transient_error_exhausts_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retrier(5)
            .call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(AnalyzerError::Transient {
                        status: 500,
                        message: "internal".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result.unwrap_err() {
            AnalyzerError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 5);
                assert!(matches!(*source, AnalyzerError::Transient { status: 500, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecoverable_error_returns_immediately_without_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retrier(5)
            .call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AnalyzerError::Malformed("bad json".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), AnalyzerError::Malformed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_stretches_the_backoff_sleep() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = retrier(5)
            .call(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(AnalyzerError::RateLimited {
                            status: 429,
                            retry_after: Some(Duration::from_secs(300)),
                        })
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        let elapsed = tokio::time::Instant::now() - started;
        assert!(
            elapsed >= Duration::from_secs(300),
            "second attempt dispatched after {elapsed:?}, provider asked for 300s"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_feedback_grows_the_shared_limiter_delay() {
        let limiter = Arc::new(RateLimiter::new(RateLimiterConfig::default()));
        let retrier = Retrier::new(Arc::clone(&limiter), 3);
        let before = limiter.current_delay().await;

        let _: Result<(), _> = retrier.call(|| async { Err(rate_limited()) }).await;

        assert!(
            limiter.current_delay().await > before,
            "repeated 429s must inflate the adaptive delay"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_budget_is_clamped_to_one() {
        let calls = AtomicU32::new(0);
        let result = retrier(0)
            .call(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AnalyzerError>(()) }
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
