//! Bounded exponential backoff.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::WebcamHttpError;

/// How often, and how patiently, a call is retried.
///
/// The delay before retry `n` (1-based) is
/// `initial_backoff * multiplier^(n - 1)`, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl RetryPolicy {
    /// # Errors
    ///
    /// Returns [`WebcamHttpError::InvalidRetryPolicy`] when `max_attempts` is
    /// zero, `multiplier` is below one or not finite, or `initial_backoff`
    /// exceeds `max_backoff`.
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        multiplier: f64,
    ) -> Result<Self, WebcamHttpError> {
        if max_attempts == 0 {
            return Err(WebcamHttpError::InvalidRetryPolicy(
                "max_attempts must be at least 1",
            ));
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(WebcamHttpError::InvalidRetryPolicy(
                "multiplier must be a finite number >= 1",
            ));
        }
        if initial_backoff > max_backoff {
            return Err(WebcamHttpError::InvalidRetryPolicy(
                "initial backoff must not exceed max backoff",
            ));
        }
        Ok(Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            multiplier,
        })
    }

    /// Total number of requests per call, first attempt included.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(secs).map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = WebcamHttpError;

    fn try_from(config: &RetryConfig) -> Result<Self, Self::Error> {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.multiplier,
        )
    }
}
