//! Retry/backoff controller for generation-service calls
//!
//! Pure retry policy over an opaque async operation. Rate-limit-class
//! failures are retried with exponential backoff plus jitter; everything
//! else propagates immediately. The controller knows nothing about what
//! the wrapped call does.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::GenerationError;

/// Marker substrings identifying rate-limit-class provider failures
///
/// Matched case-insensitively against the rendered error text; providers
/// signal quota exhaustion inconsistently, so this is textual on purpose.
pub const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "429",
    "quota",
    "too many requests",
    "resource exhausted",
];

/// Whether an error's rendered text marks it as rate-limit class
pub fn is_rate_limit_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Backoff policy for transient generation failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first call
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base: Duration,
    /// Backoff growth factor per retry
    pub multiplier: u32,
    /// Upper bound on any single delay
    pub cap: Duration,
    /// Maximum uniform jitter added to each delay
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base: Duration::from_secs(4),
            multiplier: 2,
            cap: Duration::from_secs(60),
            jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), before jitter
    fn backoff(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry.saturating_sub(1));
        self.base.saturating_mul(factor).min(self.cap)
    }

    /// Run the operation under this policy
    ///
    /// Retries only failures whose rendered text matches the rate-limit
    /// markers, up to `max_attempts` total calls. Exhausted retries
    /// surface as [`GenerationError::RetriesExhausted`], which carries
    /// user guidance in its message.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut last: Option<GenerationError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                let jitter_ms = rand::rng().random_range(0..=self.jitter.as_millis() as u64);
                let delay = self.backoff(attempt - 1) + Duration::from_millis(jitter_ms);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying after rate-limit error");
                tokio::time::sleep(delay).await;
            }

            match op().await {
                Ok(value) => {
                    debug!(attempt, "RetryPolicy::run: succeeded");
                    return Ok(value);
                }
                Err(err) => {
                    if !is_rate_limit_text(&err.to_string()) {
                        debug!(attempt, error = %err, "RetryPolicy::run: non-transient, propagating");
                        return Err(err);
                    }
                    debug!(attempt, error = %err, "RetryPolicy::run: rate-limit class failure");
                    last = Some(err);
                }
            }
        }

        let last = last.map(|e| e.to_string()).unwrap_or_default();
        Err(GenerationError::RetriesExhausted {
            attempts: self.max_attempts,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base: Duration::from_millis(1),
            multiplier: 2,
            cap: Duration::from_millis(4),
            jitter: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_marker_classification() {
        assert!(is_rate_limit_text("API error 429: slow down"));
        assert!(is_rate_limit_text("Quota exceeded for project"));
        assert!(is_rate_limit_text("RESOURCE EXHAUSTED"));
        assert!(is_rate_limit_text("too many requests"));
        assert!(!is_rate_limit_text("API error 500: boom"));
        assert!(!is_rate_limit_text("invalid response: empty"));
    }

    #[test]
    fn test_backoff_schedule_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
        assert_eq!(policy.backoff(3), Duration::from_secs(16));
        assert_eq!(policy.backoff(6), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_rate_limited_error_attempts_exactly_three_calls() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(GenerationError::Api {
                        status: 429,
                        message: "quota".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert!(err.to_string().contains("wait a few minutes"));
    }

    #[tokio::test]
    async fn test_permanent_error_attempts_exactly_one_call() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy()
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(GenerationError::InvalidResponse("garbage".to_string())) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), GenerationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = fast_policy()
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(GenerationError::RateLimited {
                            message: "hold on".to_string(),
                        })
                    } else {
                        Ok("recovered".to_string())
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
