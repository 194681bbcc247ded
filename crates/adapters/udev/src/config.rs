use std::time::Duration;

use serde::Deserialize;

use gopro_domain::classifier::NETWORK_SUBSYSTEM;

/// Configuration for the udev bus source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UdevConfig {
    /// Kernel-side subsystem pre-filter. `None` listens to every subsystem.
    pub subsystem: Option<String>,
    /// How long the monitor thread sleeps when the socket has nothing to read.
    pub poll_interval_ms: u64,
}

impl UdevConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for UdevConfig {
    fn default() -> Self {
        Self {
            subsystem: Some(NETWORK_SUBSYSTEM.to_string()),
            poll_interval_ms: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_filter_network_subsystem_by_default() {
        let config = UdevConfig::default();
        assert_eq!(config.subsystem.as_deref(), Some("net"));
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
    }

    #[test]
    fn should_deserialize_from_toml() {
        let config: UdevConfig = toml::from_str(
            r#"
            subsystem = "usb"
            poll_interval_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.subsystem.as_deref(), Some("usb"));
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn should_keep_defaults_for_missing_fields() {
        let config: UdevConfig = toml::from_str("poll_interval_ms = 10").unwrap();
        assert_eq!(config.subsystem.as_deref(), Some("net"));
        assert_eq!(config.poll_interval_ms, 10);
    }
}
