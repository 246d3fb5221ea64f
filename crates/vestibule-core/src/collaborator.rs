//! Pluggable collaborators used by the dispatcher.
//!
//! All of them are optional at registration time. The endpoint compiler
//! refuses to build an endpoint whose configuration needs one that is
//! missing.

use serde_json::{Map, Value};

use crate::token::{Token, TokenPayload};

/// Decides whether a permission bitset satisfies an endpoint.
pub trait Authorizer: Send + Sync {
    /// `request_perms` is the caller's packed bitset, `endpoint_perms` the
    /// bit positions of the endpoint's declared permissions.
    fn is_allowed(&self, request_perms: &[u8], endpoint_perms: &[u32]) -> anyhow::Result<bool>;
}

/// Turns the raw `Authorization` header value into a token.
pub trait TokenDecoder: Send + Sync {
    /// Decodes `raw`, already stripped of any `Bearer ` prefix.
    fn decode(&self, raw: &[u8]) -> anyhow::Result<Box<dyn Token>>;
}

/// Maps permission names to bit positions.
pub trait PermissionManager: Send + Sync {
    /// Bit position of `name`, `None` if the permission is unknown.
    fn permission_bit_pos(&self, name: &str) -> Option<u32>;
}

/// Reports revoked access tokens.
pub trait RevokeTokenChecker: Send + Sync {
    /// Returns true if `token` has been revoked.
    fn is_token_revoked(&self, token: &str) -> anyhow::Result<bool>;
}

/// Enables extra logging for selected callers.
pub trait RequestDebugger: Send + Sync {
    /// Returns `(in, out)`: whether to log the request and the response
    /// bodies for this caller.
    fn is_debug_required(&self, payload: &dyn TokenPayload) -> (bool, bool);
}

/// Receives server-class failures.
pub trait Alarmer: Send + Sync {
    /// Raises an alarm. `fields` is the full log record of the request.
    fn alarm(&self, fields: &Map<String, Value>);
}

/// Receives one observation per dispatched request.
pub trait MetricReporter: Send + Sync {
    /// `duration_secs` is the wall time since dispatch began, `size` the
    /// response body length in bytes.
    fn report_metric(&self, method: &str, path: &str, status: u16, duration_secs: f64, size: usize);
}
