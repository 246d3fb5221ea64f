//! Prometheus metrics.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `vestibule_requests_total` | Counter | `method`, `path`, `status` |
//! | `vestibule_request_duration_seconds` | Histogram | `method`, `path` |
//! | `vestibule_response_size_bytes` | Histogram | `method`, `path` |
//! | `vestibule_alarms_total` | Counter | - |
//!
//! `path` is the endpoint pattern (`/customers/{id}`), never the concrete
//! request path, so label cardinality stays bounded.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use vestibule_core::MetricReporter;

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Request counter.
pub const REQUESTS_TOTAL: &str = "vestibule_requests_total";
/// Request duration histogram.
pub const REQUEST_DURATION: &str = "vestibule_request_duration_seconds";
/// Response size histogram.
pub const RESPONSE_SIZE: &str = "vestibule_response_size_bytes";
/// Alarm counter.
pub const ALARMS_TOTAL: &str = "vestibule_alarms_total";

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Handle to the installed Prometheus recorder.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps an existing handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn builder(config: &MetricsConfig) -> TelemetryResult<PrometheusBuilder> {
    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Installs the global Prometheus recorder.
///
/// Returns `None` when metrics are disabled.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = builder(config)?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION, "Request duration in seconds");
    describe_histogram!(RESPONSE_SIZE, "Response body size in bytes");
    describe_counter!(ALARMS_TOTAL, "Total number of raised alarms");
}

/// [`MetricReporter`] that records through the `metrics` facade.
///
/// Works with whatever recorder is installed; pair it with
/// [`init_metrics`] for Prometheus output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusReporter;

impl MetricReporter for PrometheusReporter {
    fn report_metric(&self, method: &str, path: &str, status: u16, duration_secs: f64, size: usize) {
        counter!(
            REQUESTS_TOTAL,
            "method" => method.to_string(),
            "path" => path.to_string(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            REQUEST_DURATION,
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(duration_secs);

        histogram!(
            RESPONSE_SIZE,
            "method" => method.to_string(),
            "path" => path.to_string()
        )
        .record(size as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_empty_buckets_rejected() {
        let config = MetricsConfig {
            duration_buckets: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(builder(&config), Err(TelemetryError::InvalidConfig(_))));
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }

    #[test]
    fn test_reporter_records_labels() {
        let recorder = builder(&MetricsConfig::default()).unwrap().build_recorder();
        let registry = MetricsRegistry::new(recorder.handle());

        metrics::with_local_recorder(&recorder, || {
            PrometheusReporter.report_metric("GET", "/orders/{id}", 404, 0.02, 31);
        });

        let text = registry.render();
        assert!(text.contains(REQUESTS_TOTAL));
        assert!(text.contains(r#"path="/orders/{id}""#));
        assert!(text.contains(r#"status="404""#));
        assert!(text.contains(RESPONSE_SIZE));
    }
}
