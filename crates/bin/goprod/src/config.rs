//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `goprod.toml` in the working directory, or at the path named by
//! `GOPROD_CONFIG`. Every field has a default, so the implicit `goprod.toml`
//! may be missing; a path named by `GOPROD_CONFIG` must exist.
//! Environment variables take precedence over file values.

use std::fmt;

use serde::Deserialize;

use gopro_adapter_udev::config::UdevConfig;
use gopro_adapter_webcam_http::config::WebcamHttpConfig;
use gopro_adapter_webcam_http::retry::RetryPolicy;
use gopro_domain::classifier::EventFilter;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "goprod.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where device notifications come from.
    pub bus: BusConfig,
    /// Which hotplug events the daemon reacts to.
    pub monitor: MonitorSection,
    /// Webcam bridge client settings.
    pub webcam: WebcamHttpConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Bus source selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub kind: BusKind,
    /// Settings for the `udev` source.
    pub udev: UdevConfig,
    /// Settings for the `virtual` source.
    #[serde(rename = "virtual")]
    pub virtual_bus: VirtualBusConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    /// Kernel hotplug notifications (Linux only).
    #[default]
    Udev,
    /// In-process simulated feed.
    Virtual,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udev => f.write_str("udev"),
            Self::Virtual => f.write_str("virtual"),
        }
    }
}

impl std::str::FromStr for BusKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "udev" => Ok(Self::Udev),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown bus kind {other:?}, expected \"udev\" or \"virtual\""
            ))),
        }
    }
}

/// Virtual bus settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VirtualBusConfig {
    /// Device paths plugged in as HERO8 webcams right after startup.
    pub plug: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonitorSection {
    /// Event kinds to react to (`connected`, `disconnected`). Must not be empty.
    pub events: EventFilter,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "goprod=info,gopro=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the config file (if present), then apply
    /// environment-variable overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed (or is missing
    /// while named by `GOPROD_CONFIG`), an override is malformed, or the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("GOPROD_CONFIG") {
            Ok(path) => Self::from_file(&path, true)?,
            Err(_) => Self::from_file(DEFAULT_CONFIG_PATH, false)?,
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("GOPROD_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("GOPROD_BUS") {
            self.bus.kind = val.parse()?;
        }
        if let Some(val) = lookup("GOPROD_WEBCAM_TIMEOUT_SECS") {
            self.webcam.request_timeout_secs = parse_number("GOPROD_WEBCAM_TIMEOUT_SECS", &val)?;
        }
        if let Some(val) = lookup("GOPROD_WEBCAM_MAX_ATTEMPTS") {
            self.webcam.retry.max_attempts = parse_number("GOPROD_WEBCAM_MAX_ATTEMPTS", &val)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bus.kind == BusKind::Udev && self.bus.udev.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "bus.udev.poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.webcam.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "webcam.request_timeout_secs must be non-zero".to_string(),
            ));
        }
        RetryPolicy::try_from(&self.webcam.retry)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} must be a number, got {value:?}")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
