//! Retry policy value object.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use storyboard_error::{StoryError, StoryErrorKind};
use tokio_retry2::strategy::{ExponentialFactorBackoff, jitter};

/// How an unreliable operation is retried.
///
/// Durations are stored in milliseconds so the policy can be read straight from
/// TOML configuration.
///
/// ```toml
/// [retry.image]
/// max_attempts = 3
/// base_delay_ms = 2000
/// backoff_multiplier = 1.5
/// max_delay_ms = 30000
/// timeout_ms = 60000
/// jitter = false
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Attempts before giving up (at least 1)
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
    /// Delay before the second attempt
    #[serde(default = "default_base_delay_ms")]
    base_delay_ms: u64,
    /// Growth factor applied to the delay after each failed attempt
    #[serde(default = "default_backoff_multiplier")]
    backoff_multiplier: f64,
    /// Ceiling for any single delay
    #[serde(default = "default_max_delay_ms")]
    max_delay_ms: u64,
    /// Per-attempt timeout
    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,
    /// Randomize each delay
    #[serde(default)]
    jitter: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            timeout_ms: default_timeout_ms(),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Create a policy without jitter.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        backoff_multiplier: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            max_attempts,
            base_delay_ms: base_delay.as_millis() as u64,
            backoff_multiplier,
            timeout_ms: timeout.as_millis() as u64,
            ..Self::default()
        }
    }

    /// Defaults for text generation calls.
    pub fn text() -> Self {
        Self::default()
    }

    /// Defaults for image generation calls.
    pub fn image() -> Self {
        Self {
            base_delay_ms: 2000,
            ..Self::default()
        }
    }

    /// Delay before the second attempt.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Ceiling for any single delay.
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delays between attempts, in order.
    ///
    /// Yields `max_attempts - 1` delays of `base_delay * backoff_multiplier^n`,
    /// each capped at `max_delay` and jittered when enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use storyboard_retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_millis(1000), 2.0, Duration::from_secs(5));
    /// let delays: Vec<_> = policy.backoff().collect();
    /// assert_eq!(delays, vec![Duration::from_millis(1000), Duration::from_millis(2000)]);
    /// ```
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + Send + use<> {
        let jittered = self.jitter;
        ExponentialFactorBackoff::from_millis(self.base_delay_ms, self.backoff_multiplier)
            .max_delay(self.max_delay())
            .map(move |delay| if jittered { jitter(delay) } else { delay })
            .take(self.max_attempts.saturating_sub(1) as usize)
    }

    /// Reject policies that can never run an attempt or never finish one.
    #[track_caller]
    pub fn validate(&self) -> Result<(), StoryError> {
        if self.max_attempts == 0 {
            return Err(StoryError::new(StoryErrorKind::InvalidPolicy(
                "max_attempts must be at least 1".to_string(),
            )));
        }
        if self.timeout_ms == 0 {
            return Err(StoryError::new(StoryErrorKind::InvalidPolicy(
                "timeout_ms must be greater than 0".to_string(),
            )));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(StoryError::new(StoryErrorKind::InvalidPolicy(format!(
                "backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_and_cap() {
        let policy = RetryPolicy::default()
            .with_max_attempts(9)
            .with_base_delay_ms(1000)
            .with_backoff_multiplier(2.0)
            .with_max_delay_ms(3000);
        let delays: Vec<_> = policy.backoff().collect();
        assert_eq!(delays.len(), 8);
        assert_eq!(delays[0], Duration::from_millis(1000));
        assert_eq!(delays[1], Duration::from_millis(2000));
        assert_eq!(delays[2], Duration::from_millis(3000));
        assert_eq!(delays[7], Duration::from_millis(3000));
    }

    #[test]
    fn single_attempt_has_no_delays() {
        let policy = RetryPolicy::default().with_max_attempts(1);
        assert_eq!(policy.backoff().count(), 0);
    }

    #[test]
    fn jittered_delays_stay_within_half_and_one_and_a_half() {
        let policy = RetryPolicy::default()
            .with_max_attempts(2)
            .with_base_delay_ms(1000)
            .with_jitter(true);
        let delay = policy.backoff().next().unwrap();
        assert!(delay >= Duration::from_millis(500));
        assert!(delay <= Duration::from_millis(1500));
    }

    #[test]
    fn image_defaults_start_slower() {
        assert_eq!(RetryPolicy::image().base_delay(), Duration::from_millis(2000));
        assert_eq!(RetryPolicy::text().base_delay(), Duration::from_millis(1000));
        assert_eq!(*RetryPolicy::image().max_attempts(), 3);
    }

    #[test]
    fn validate_rejects_unusable_policies() {
        assert!(RetryPolicy::default().with_max_attempts(0).validate().is_err());
        assert!(RetryPolicy::default().with_timeout_ms(0).validate().is_err());
        assert!(
            RetryPolicy::default()
                .with_backoff_multiplier(0.5)
                .validate()
                .is_err()
        );
        assert!(RetryPolicy::default().validate().is_ok());
    }
}
