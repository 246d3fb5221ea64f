//! Collaborator doubles for dispatcher tests.
//!
//! ```rust
//! use std::sync::Arc;
//! use vestibule_core::TokenDecoder;
//! use vestibule_test::fixtures::{FixedPayload, StaticTokenDecoder};
//!
//! let decoder = StaticTokenDecoder::new()
//!     .with_token("alice", FixedPayload::new(1, "alice").with_perms(vec![0b0000_0011]));
//!
//! let token = decoder.decode(b"alice").unwrap();
//! assert_eq!(token.application_payload().login(), "alice");
//! assert!(decoder.decode(b"mallory").is_err());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use vestibule_core::{Alarmer, MetricReporter, Token, TokenDecoder, TokenPayload};

/// Token payload with fixed values.
#[derive(Debug, Clone, Default)]
pub struct FixedPayload {
    user: i64,
    login: String,
    role: i64,
    perms: Vec<u8>,
    extra: Option<Value>,
    debug: bool,
}

impl FixedPayload {
    /// Payload of `login` with user id `user` and no permissions.
    #[must_use]
    pub fn new(user: i64, login: impl Into<String>) -> Self {
        Self {
            user,
            login: login.into(),
            ..Self::default()
        }
    }

    /// Sets the role id.
    #[must_use]
    pub fn with_role(mut self, role: i64) -> Self {
        self.role = role;
        self
    }

    /// Sets the packed permission bitset.
    #[must_use]
    pub fn with_perms(mut self, perms: Vec<u8>) -> Self {
        self.perms = perms;
        self
    }

    /// Sets extra application data.
    #[must_use]
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Sets the debug flag.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl TokenPayload for FixedPayload {
    fn user(&self) -> i64 {
        self.user
    }

    fn login(&self) -> &str {
        &self.login
    }

    fn role(&self) -> i64 {
        self.role
    }

    fn perms(&self) -> &[u8] {
        &self.perms
    }

    fn extra(&self) -> Option<&Value> {
        self.extra.as_ref()
    }

    fn debug(&self) -> bool {
        self.debug
    }
}

/// Decoded token around a [`FixedPayload`].
#[derive(Debug, Clone)]
pub struct FixedToken {
    claims: Map<String, Value>,
    payload: Arc<FixedPayload>,
}

impl FixedToken {
    /// Token carrying `payload` and no registered claims.
    #[must_use]
    pub fn new(payload: FixedPayload) -> Self {
        Self {
            claims: Map::new(),
            payload: Arc::new(payload),
        }
    }

    /// Adds a registered claim.
    #[must_use]
    pub fn with_claim(mut self, name: impl Into<String>, value: Value) -> Self {
        self.claims.insert(name.into(), value);
        self
    }
}

impl Token for FixedToken {
    fn system_payload(&self) -> &Map<String, Value> {
        &self.claims
    }

    fn application_payload(&self) -> Arc<dyn TokenPayload> {
        self.payload.clone()
    }
}

/// Decodes a fixed set of raw token strings. Unknown strings fail.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenDecoder {
    tokens: HashMap<String, FixedToken>,
}

impl StaticTokenDecoder {
    /// Decoder that knows no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `raw` as a token carrying `payload`.
    #[must_use]
    pub fn with_token(mut self, raw: impl Into<String>, payload: FixedPayload) -> Self {
        self.tokens.insert(raw.into(), FixedToken::new(payload));
        self
    }
}

impl TokenDecoder for StaticTokenDecoder {
    fn decode(&self, raw: &[u8]) -> anyhow::Result<Box<dyn Token>> {
        let raw = std::str::from_utf8(raw)?;
        self.tokens
            .get(raw)
            .map(|token| Box::new(token.clone()) as Box<dyn Token>)
            .ok_or_else(|| anyhow::anyhow!("unknown token"))
    }
}

/// Records every alarm.
#[derive(Debug, Default)]
pub struct RecordingAlarmer {
    alarms: Mutex<Vec<Map<String, Value>>>,
}

impl RecordingAlarmer {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alarms raised so far.
    pub fn alarms(&self) -> Vec<Map<String, Value>> {
        self.alarms.lock().clone()
    }

    /// Number of alarms raised.
    pub fn len(&self) -> usize {
        self.alarms.lock().len()
    }

    /// Returns true if no alarm was raised.
    pub fn is_empty(&self) -> bool {
        self.alarms.lock().is_empty()
    }
}

impl Alarmer for RecordingAlarmer {
    fn alarm(&self, fields: &Map<String, Value>) {
        self.alarms.lock().push(fields.clone());
    }
}

/// One reported request metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    /// Request method.
    pub method: String,
    /// Endpoint path.
    pub path: String,
    /// Response status.
    pub status: u16,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Response body size.
    pub size: usize,
}

/// Records every reported metric.
#[derive(Debug, Default)]
pub struct RecordingMetricReporter {
    records: Mutex<Vec<MetricRecord>>,
}

impl RecordingMetricReporter {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics reported so far.
    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().clone()
    }

    /// Statuses reported so far, in order.
    pub fn statuses(&self) -> Vec<u16> {
        self.records.lock().iter().map(|r| r.status).collect()
    }
}

impl MetricReporter for RecordingMetricReporter {
    fn report_metric(&self, method: &str, path: &str, status: u16, duration_secs: f64, size: usize) {
        self.records.lock().push(MetricRecord {
            method: method.to_string(),
            path: path.to_string(),
            status,
            duration_secs,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_decoder() {
        let decoder = StaticTokenDecoder::new().with_token(
            "bob",
            FixedPayload::new(7, "bob").with_role(2).with_debug(true),
        );
        let token = decoder.decode(b"bob").unwrap();
        let payload = token.application_payload();
        assert_eq!(payload.user(), 7);
        assert_eq!(payload.role(), 2);
        assert!(payload.debug());
        assert!(token.system_payload().is_empty());

        let err = decoder.decode(b"eve").err().unwrap();
        assert_eq!(err.to_string(), "unknown token");
    }

    #[test]
    fn test_recorders() {
        let alarmer = RecordingAlarmer::new();
        assert!(alarmer.is_empty());
        let mut fields = Map::new();
        fields.insert("status".into(), json!(500));
        alarmer.alarm(&fields);
        assert_eq!(alarmer.len(), 1);
        assert_eq!(alarmer.alarms()[0]["status"], 500);

        let reporter = RecordingMetricReporter::new();
        reporter.report_metric("GET", "/api/orders", 200, 0.01, 12);
        reporter.report_metric("GET", "/api/orders", 404, 0.01, 0);
        assert_eq!(reporter.statuses(), vec![200, 404]);
        assert_eq!(reporter.records()[0].path, "/api/orders");
    }
}
