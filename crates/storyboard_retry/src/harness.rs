//! Bounded retries with backoff, per-attempt timeouts and cooperative cancellation.

use crate::RetryPolicy;
use std::fmt::Display;
use std::future::Future;
use storyboard_error::{RetryError, RetryErrorKind, RetryableError, TimeoutError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Drives an unreliable async operation to completion under a [`RetryPolicy`].
///
/// Each attempt races the operation against the policy timeout. Errors that
/// report themselves as non-retryable end the loop immediately. The stop signal
/// is checked before every attempt and interrupts backoff sleeps; an attempt
/// already in flight is never preempted.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyboard_error::CollaboratorError;
/// use storyboard_retry::{RetryHarness, RetryPolicy};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let policy = RetryPolicy::new(3, Duration::from_millis(1), 2.0, Duration::from_secs(1));
/// let harness = RetryHarness::new(policy, CancellationToken::new());
///
/// let value = harness
///     .run("answer", || async { Ok::<_, CollaboratorError>(42) })
///     .await
///     .unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryHarness {
    policy: RetryPolicy,
    stop: CancellationToken,
}

impl RetryHarness {
    /// Create a harness bound to a run-scoped stop signal.
    pub fn new(policy: RetryPolicy, stop: CancellationToken) -> Self {
        Self { policy, stop }
    }

    /// The policy in force.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The stop signal this harness observes.
    pub fn stop_signal(&self) -> &CancellationToken {
        &self.stop
    }

    /// Run `operation` until it succeeds, is rejected, exhausts its attempts, or
    /// the stop signal fires.
    ///
    /// `label` names the operation in logs.
    #[instrument(
        name = "retry",
        skip(self, operation),
        fields(max_attempts = *self.policy.max_attempts())
    )]
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + TimeoutError + Display,
    {
        let max_attempts = (*self.policy.max_attempts()).max(1);
        let timeout = self.policy.timeout();
        let mut delays = self.policy.backoff();
        let mut attempt: u32 = 0;

        loop {
            if self.stop.is_cancelled() {
                debug!(attempts = attempt, "Stop requested before attempt");
                return Err(RetryError::new(RetryErrorKind::Cancelled { attempts: attempt }));
            }

            attempt += 1;
            let outcome = match tokio::time::timeout(timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(timeout)),
            };

            let (err, retry_after) = match outcome.map_err(classify) {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(tokio_retry2::RetryError::Permanent(err)) => {
                    warn!(attempt, error = %err, "Permanent error, not retrying");
                    return Err(RetryError::new(RetryErrorKind::Rejected {
                        attempt,
                        error: err,
                    }));
                }
                Err(tokio_retry2::RetryError::Transient { err, retry_after }) => (err, retry_after),
            };

            let Some(scheduled) = delays.next() else {
                warn!(attempts = attempt, error = %err, "Retries exhausted");
                return Err(RetryError::new(RetryErrorKind::Exhausted {
                    attempts: attempt,
                    last_error: err,
                }));
            };
            let delay = retry_after
                .map(|hint| hint.min(self.policy.max_delay()))
                .unwrap_or(scheduled);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient error, will retry"
            );

            tokio::select! {
                _ = self.stop.cancelled() => {
                    debug!(attempts = attempt, "Stop requested during backoff");
                    return Err(RetryError::new(RetryErrorKind::Cancelled { attempts: attempt }));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

/// Sort a failed attempt into permanent or transient, carrying any server hint.
fn classify<E: RetryableError>(err: E) -> tokio_retry2::RetryError<E> {
    if !err.is_retryable() {
        return tokio_retry2::RetryError::Permanent(err);
    }
    match err.retry_after() {
        Some(hint) => tokio_retry2::RetryError::retry_after(err, hint),
        None => tokio_retry2::RetryError::transient(err),
    }
}

/// Run `operation` under `policy`, observing `stop`.
///
/// Convenience wrapper around [`RetryHarness::run`].
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    stop: &CancellationToken,
    label: &str,
    operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + TimeoutError + Display,
{
    RetryHarness::new(policy.clone(), stop.clone())
        .run(label, operation)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storyboard_error::{CollaboratorError, CollaboratorErrorKind};

    #[test]
    fn classify_separates_permanent_transient_and_hinted() {
        let permanent = classify(CollaboratorError::http(400, "bad prompt"));
        assert!(matches!(permanent, tokio_retry2::RetryError::Permanent(_)));

        let transient = classify(CollaboratorError::http(503, "busy"));
        assert!(matches!(
            transient,
            tokio_retry2::RetryError::Transient { retry_after: None, .. }
        ));

        let hinted = classify(CollaboratorError::new(CollaboratorErrorKind::RateLimited {
            retry_after_ms: Some(3000),
        }));
        assert!(matches!(
            hinted,
            tokio_retry2::RetryError::Transient { retry_after: Some(d), .. }
                if d == Duration::from_millis(3000)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_hint_is_honored() {
        let policy = RetryPolicy::default()
            .with_max_attempts(2)
            .with_base_delay_ms(100);
        let harness = RetryHarness::new(policy, CancellationToken::new());
        let start = tokio::time::Instant::now();
        let mut calls = 0;
        let result = harness
            .run("hinted", || {
                calls += 1;
                let first = calls == 1;
                async move {
                    if first {
                        Err(CollaboratorError::new(CollaboratorErrorKind::RateLimited {
                            retry_after_ms: Some(4000),
                        }))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(start.elapsed(), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_hint_is_capped_at_max_delay() {
        let policy = RetryPolicy::default()
            .with_max_attempts(2)
            .with_base_delay_ms(100)
            .with_max_delay_ms(5000);
        let harness = RetryHarness::new(policy, CancellationToken::new());
        let start = tokio::time::Instant::now();
        let mut calls = 0;
        let result = harness
            .run("hinted", || {
                calls += 1;
                let first = calls == 1;
                async move {
                    if first {
                        Err(CollaboratorError::new(CollaboratorErrorKind::RateLimited {
                            retry_after_ms: Some(60_000),
                        }))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(start.elapsed(), Duration::from_millis(5000));
    }
}
