//! Layered configuration loader.

use std::env;
use std::fs;
use std::path::Path;

use vestibule_core::LogOption;

use crate::{ConfigError, VestibuleConfig};

/// Loads configuration in layers, later layers overriding earlier ones:
/// 1. defaults or a preset
/// 2. a TOML or JSON file
/// 3. `PREFIX__SECTION__KEY` environment variables
///
/// # Example
///
/// ```no_run
/// use vestibule_config::ConfigLoader;
///
/// # fn main() -> Result<(), vestibule_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("vestibule.toml")?
///     .with_dotenv()?
///     .with_env_prefix("VESTIBULE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: VestibuleConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use vestibule_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = VestibuleConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = VestibuleConfig::production();
        self
    }

    /// Replaces the configuration with the contents of `path`.
    ///
    /// The format follows the extension (`.toml` or `.json`). Sections
    /// missing from the file take their defaults, not the values of earlier
    /// layers.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Replaces the configuration with `content` in `format` (`"toml"` or
    /// `"json"`).
    ///
    /// ```
    /// use vestibule_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[dispatch]\nurl_prefix = \"/api\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.dispatch.url_prefix, "/api");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Loads `.env` from the current directory into the process
    /// environment, if present.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Enables `PREFIX__SECTION__KEY` overrides, e.g.
    /// `VESTIBULE__DISPATCH__DEFAULT_LOG_OPTION=full`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<VestibuleConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or
    /// validation.
    #[must_use]
    pub fn load_unvalidated(self) -> VestibuleConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_num(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => config.server.max_body_bytes = parse_num(key, value)?,
            ["SERVER", "KEEP_ALIVE"] => config.server.keep_alive = parse_bool(key, value)?,

            ["DISPATCH", "URL_PREFIX"] => config.dispatch.url_prefix = value.to_string(),
            ["DISPATCH", "STATIC_LOGGING"] => config.dispatch.static_logging = parse_bool(key, value)?,
            ["DISPATCH", "DEFAULT_LOG_OPTION"] => {
                config.dispatch.default_log_option = value
                    .parse::<LogOption>()
                    .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))?;
            }
            ["DISPATCH", "VERBOSE_ERRORS"] => config.dispatch.verbose_errors = parse_bool(key, value)?,
            ["DISPATCH", "LOG_REQUEST_ID"] => config.dispatch.log_request_id = parse_bool(key, value)?,

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "JSON_FORMAT"] => config.logging.json_format = parse_bool(key, value)?,

            ["METRICS", "ENABLED"] => config.metrics.enabled = parse_bool(key, value)?,

            // Unknown keys are left for other consumers of the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<VestibuleConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}
