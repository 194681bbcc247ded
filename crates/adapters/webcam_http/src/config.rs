//! Webcam HTTP controller configuration.

use serde::Deserialize;

/// Configuration for the HTTP webcam controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebcamHttpConfig {
    /// Upper bound for one request, connect included, in seconds.
    pub request_timeout_secs: u16,
    /// Upper bound for establishing the TCP connection, in seconds.
    pub connect_timeout_secs: u16,
    /// Retry behaviour for transient failures.
    pub retry: RetryConfig,
}

/// Bounded exponential backoff settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of requests per call, first attempt included.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Cap on any single delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
}

impl Default for WebcamHttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            connect_timeout_secs: 5,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = WebcamHttpConfig::default();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
        assert_eq!(config.retry.max_backoff_ms, 30_000);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r"
            request_timeout_secs = 3
            connect_timeout_secs = 1

            [retry]
            max_attempts = 8
            initial_backoff_ms = 100
            max_backoff_ms = 2000
            multiplier = 1.5
        ";
        let config: WebcamHttpConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.connect_timeout_secs, 1);
        assert_eq!(config.retry.max_attempts, 8);
        assert_eq!(config.retry.initial_backoff_ms, 100);
        assert_eq!(config.retry.max_backoff_ms, 2000);
        assert!((config.retry.multiplier - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = "
            [retry]
            max_attempts = 2
        ";
        let config: WebcamHttpConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
        assert_eq!(config.request_timeout_secs, 10);
    }
}
