//! Configuration sections.

use serde::{Deserialize, Serialize};
use vestibule_core::LogOption;

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Listen address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Seconds to wait for in-flight connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Largest accepted request body.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Whether HTTP/1.1 keep-alive is enabled.
    #[serde(default = "default_true")]
    pub keep_alive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_body_bytes: default_max_body_bytes(),
            keep_alive: true,
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

/// Dispatcher settings shared by every endpoint.
///
/// ```toml
/// [dispatch]
/// url_prefix = "/api/v1"
/// default_log_option = "exit|reqBody"
/// verbose_errors = false
/// log_request_id = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct DispatchSection {
    /// Prefix joined in front of every endpoint path.
    pub url_prefix: String,

    /// Read the log option once at compile time instead of per request.
    pub static_logging: bool,

    /// Log option for endpoints that declare none. Flag names or presets.
    pub default_log_option: LogOption,

    /// Include the error chain and attributes in error responses.
    pub verbose_errors: bool,

    /// Add the request ID to every request's log attributes.
    pub log_request_id: bool,
}
