//! Retry controller for external generation calls
//!
//! Wraps a single external call with exponential backoff and jitter.
//! Failures never propagate: the caller receives either the generated text
//! or a [`RetryOutcome::Fallback`] telling it to use fallback data.
//!
//! **Algorithm:**
//! 1. Invoke the operation, bounded by the per-call deadline
//! 2. On success, return the text
//! 3. On [`GenerationError::RateLimited`]:
//!    a. If attempts remain: sleep `jitter(delay)`, double `delay`, retry
//!    b. Otherwise: fall back
//! 4. On any other failure or a deadline breach: fall back immediately
//!
//! Jitter draws a uniform factor from `[1 - j, 1 + j]` (j = 0.5 by default).

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use super::text_generator::GenerationError;
use huemood_common::config::GenerationConfig;

/// Why a call ended on the fallback path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Still rate limited after the last attempt
    RateLimitExhausted { attempts: u32 },
    /// Non-retryable failure
    Failed(GenerationError),
    /// Per-call deadline breached
    TimedOut,
}

/// Result of a retried call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    Success(String),
    Fallback(FallbackReason),
}

/// Backoff policy for external calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles after each retry
    pub base_delay: Duration,
    /// Jitter band as a fraction of the delay
    pub jitter_factor: f64,
    /// Deadline for each individual call
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            jitter_factor: 0.5,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            jitter_factor: config.jitter_factor.clamp(0.0, 1.0),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
        }
    }

    /// Run `operation` under this policy
    ///
    /// # Arguments
    /// * `operation_name` - Name for logging (e.g., "palette for Calm")
    /// * `operation` - Closure performing one external call per invocation
    pub async fn invoke_with_retry<F, Fut>(
        &self,
        operation_name: &str,
        mut operation: F,
    ) -> RetryOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, GenerationError>>,
    {
        let mut attempt = 0u32;
        let mut delay = self.base_delay;

        loop {
            attempt += 1;

            let result = match tokio::time::timeout(self.call_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        timeout_ms = self.call_timeout.as_millis() as u64,
                        "Generation call exceeded deadline, using fallback"
                    );
                    return RetryOutcome::Fallback(FallbackReason::TimedOut);
                }
            };

            match result {
                Ok(text) => {
                    if attempt > 1 {
                        tracing::debug!(
                            operation = operation_name,
                            attempt,
                            "Generation call succeeded after retry"
                        );
                    }
                    return RetryOutcome::Success(text);
                }
                Err(GenerationError::RateLimited) if attempt < self.max_attempts => {
                    let sleep_for =
                        jittered_delay(&mut rand::thread_rng(), delay, self.jitter_factor);

                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        delay_ms = sleep_for.as_millis() as u64,
                        "Rate limited, retrying after backoff"
                    );

                    tokio::time::sleep(sleep_for).await;
                    delay = delay.saturating_mul(2);
                }
                Err(GenerationError::RateLimited) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempts = attempt,
                        "Exceeded max retries while rate limited, using fallback"
                    );
                    return RetryOutcome::Fallback(FallbackReason::RateLimitExhausted {
                        attempts: attempt,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Generation call failed, using fallback"
                    );
                    return RetryOutcome::Fallback(FallbackReason::Failed(err));
                }
            }
        }
    }
}

/// Delay scaled by a uniform factor in `[1 - jitter, 1 + jitter]`
pub fn jittered_delay<R: Rng + ?Sized>(
    rng: &mut R,
    base: Duration,
    jitter_factor: f64,
) -> Duration {
    let jitter = jitter_factor.clamp(0.0, 1.0);
    if jitter == 0.0 {
        return base;
    }
    let factor = rng.gen_range((1.0 - jitter)..=(1.0 + jitter));
    base.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let mut rng = rand::thread_rng();
        let base = Duration::from_millis(1000);
        for _ in 0..1000 {
            let d = jittered_delay(&mut rng, base, 0.5);
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(1500), "{d:?}");
        }
    }

    #[test]
    fn test_zero_jitter_is_exact() {
        let mut rng = rand::thread_rng();
        assert_eq!(
            jittered_delay(&mut rng, Duration::from_millis(250), 0.0),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_policy_from_config() {
        let config = GenerationConfig {
            max_attempts: 0,
            base_delay_ms: 200,
            ..GenerationConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_attempt() {
        let mut calls = 0;
        let outcome = policy()
            .invoke_with_retry("test_op", || {
                calls += 1;
                async { Ok("text".to_string()) }
            })
            .await;

        assert_eq!(outcome, RetryOutcome::Success("text".to_string()));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_rate_limits() {
        let mut calls: Vec<Instant> = Vec::new();

        let outcome = policy()
            .invoke_with_retry("test_op", || {
                calls.push(Instant::now());
                let n = calls.len();
                async move {
                    if n < 3 {
                        Err(GenerationError::RateLimited)
                    } else {
                        Ok("finally".to_string())
                    }
                }
            })
            .await;

        assert_eq!(outcome, RetryOutcome::Success("finally".to_string()));
        assert_eq!(calls.len(), 3);

        let first = calls[1] - calls[0];
        let second = calls[2] - calls[1];
        let within = |d: Duration, lo: u64, hi: u64| {
            d >= Duration::from_millis(lo) && d <= Duration::from_millis(hi)
        };
        assert!(within(first, 500, 1500), "{first:?}");
        assert!(within(second, 1000, 3000), "{second:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_exhaustion_falls_back() {
        let mut calls = 0;
        let outcome = policy()
            .invoke_with_retry("test_op", || {
                calls += 1;
                async { Err(GenerationError::RateLimited) }
            })
            .await;

        assert_eq!(
            outcome,
            RetryOutcome::Fallback(FallbackReason::RateLimitExhausted { attempts: 3 })
        );
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_fall_back_without_retry() {
        for err in [
            GenerationError::Transient("connection reset".to_string()),
            GenerationError::Fatal("bad request".to_string()),
        ] {
            let mut calls = 0;
            let expected = err.clone();
            let outcome = policy()
                .invoke_with_retry("test_op", || {
                    calls += 1;
                    let err = err.clone();
                    async move { Err(err) }
                })
                .await;

            assert_eq!(outcome, RetryOutcome::Fallback(FallbackReason::Failed(expected)));
            assert_eq!(calls, 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let policy = RetryPolicy {
            call_timeout: Duration::from_secs(2),
            ..RetryPolicy::default()
        };
        let mut calls = 0;

        let outcome = policy
            .invoke_with_retry("test_op", || {
                calls += 1;
                async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("too late".to_string())
                }
            })
            .await;

        assert_eq!(outcome, RetryOutcome::Fallback(FallbackReason::TimedOut));
        assert_eq!(calls, 1);
    }
}
