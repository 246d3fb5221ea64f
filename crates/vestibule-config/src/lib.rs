//! Typed configuration for Vestibule.
//!
//! - TOML and JSON files
//! - `PREFIX__SECTION__KEY` environment overrides and `.env` files
//! - strict parsing: unknown fields are errors
//! - `development()` and `production()` presets
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! max_body_bytes = 4194304
//!
//! [dispatch]
//! url_prefix = "/api"
//! static_logging = false
//! default_log_option = "full_on_exit"
//! verbose_errors = false
//! log_request_id = true
//!
//! [logging]
//! level = "info,vestibule_server=debug"
//! json_format = true
//!
//! [metrics]
//! enabled = true
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::VestibuleConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DispatchSection, ServerSection};
