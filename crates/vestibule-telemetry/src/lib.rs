//! Observability for Vestibule.
//!
//! - **Logging**: `tracing-subscriber` setup, JSON or pretty
//! - **Metrics**: [`PrometheusReporter`], a `MetricReporter` backed by the
//!   `metrics` facade and the Prometheus exporter
//! - **Alarms**: [`TracingAlarmer`], an `Alarmer` that logs at error level
//!
//! # Example
//!
//! ```rust,ignore
//! use vestibule_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let metrics = init_telemetry(&TelemetryConfig::default())?;
//! // serve metrics.map(|m| m.render()) from an admin port
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod alarm;
pub mod error;
pub mod logging;
pub mod metrics;

pub use alarm::TracingAlarmer;
pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use self::metrics::{init_metrics, MetricsConfig, MetricsRegistry, PrometheusReporter};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,
    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

/// Initializes logging, then metrics.
///
/// Returns the metrics registry when metrics are enabled.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)
}
