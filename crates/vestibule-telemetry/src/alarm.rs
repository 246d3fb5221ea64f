//! Alarms written to the log.

use serde_json::{Map, Value};
use vestibule_core::Alarmer;

use crate::metrics::ALARMS_TOTAL;

/// [`Alarmer`] that emits an error-level `alarm` event and counts it.
///
/// Log pipelines usually route error-level events to on-call channels, so
/// this is enough for most deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlarmer;

impl Alarmer for TracingAlarmer {
    fn alarm(&self, fields: &Map<String, Value>) {
        metrics::counter!(ALARMS_TOTAL).increment(1);
        let payload = Value::Object(fields.clone());
        tracing::error!(alarm = true, fields = %payload, "alarm");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_alarm_is_counted() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::from(503));
        metrics::with_local_recorder(&recorder, || TracingAlarmer.alarm(&fields));

        assert!(handle.render().contains("vestibule_alarms_total 1"));
    }
}
