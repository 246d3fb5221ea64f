//! Root configuration type.

use serde::{Deserialize, Serialize};
use vestibule_core::LogOption;
use vestibule_telemetry::{LogConfig, MetricsConfig};

use crate::{ConfigError, DispatchSection, ServerSection};

/// Complete Vestibule configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use vestibule_config::VestibuleConfig;
///
/// let config = VestibuleConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct VestibuleConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Dispatcher settings.
    #[serde(default)]
    pub dispatch: DispatchSection,

    /// Log output settings.
    #[serde(default)]
    pub logging: LogConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl VestibuleConfig {
    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        let prefix = &self.dispatch.url_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "dispatch.url_prefix",
                "must start with '/'",
            ));
        }

        if vestibule_telemetry::create_env_filter(&self.logging.level).is_err() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("invalid filter directive: {}", self.logging.level),
            ));
        }

        if self.metrics.enabled && self.metrics.duration_buckets.is_empty() {
            return Err(ConfigError::invalid_value(
                "metrics.duration_buckets",
                "must not be empty when metrics are enabled",
            ));
        }

        Ok(())
    }

    /// Local development: readable debug logs, everything logged per
    /// request, verbose error bodies.
    ///
    /// ```
    /// use vestibule_config::VestibuleConfig;
    /// use vestibule_core::LogOption;
    ///
    /// let config = VestibuleConfig::development();
    /// assert_eq!(config.dispatch.default_log_option, LogOption::FULL);
    /// assert!(config.dispatch.verbose_errors);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                http_addr: "127.0.0.1:8080".to_string(),
                shutdown_timeout_secs: 5,
                ..ServerSection::default()
            },
            dispatch: DispatchSection {
                default_log_option: LogOption::FULL,
                verbose_errors: true,
                log_request_id: true,
                ..DispatchSection::default()
            },
            logging: LogConfig::development(),
            metrics: MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            },
        }
    }

    /// Production: JSON logs, only the exit line per request, terse error
    /// bodies.
    #[must_use]
    pub fn production() -> Self {
        Self {
            server: ServerSection::default(),
            dispatch: DispatchSection {
                default_log_option: LogOption::CONFIDENTIAL,
                static_logging: false,
                log_request_id: true,
                ..DispatchSection::default()
            },
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        VestibuleConfig::default().validate().unwrap();
        VestibuleConfig::development().validate().unwrap();
        VestibuleConfig::production().validate().unwrap();
    }

    #[test]
    fn test_production_is_confidential() {
        let config = VestibuleConfig::production();
        assert_eq!(config.dispatch.default_log_option, LogOption::EXIT);
        assert!(!config.dispatch.verbose_errors);
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_invalid_addr() {
        let mut config = VestibuleConfig::default();
        config.server.http_addr = "localhost".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_relative_prefix_rejected() {
        let mut config = VestibuleConfig::default();
        config.dispatch.url_prefix = "api".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("url_prefix"));
    }

    #[test]
    fn test_serialize_roundtrip_toml() {
        let config = VestibuleConfig::development();
        let text = toml::to_string(&config).unwrap();
        let back: VestibuleConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
