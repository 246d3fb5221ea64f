//! Request-scoped errors.
//!
//! Every failure that can happen while a request is being dispatched is a
//! [`DispatchError`]. The dispatcher converts it into a status code, a JSON
//! body (see [`ErrorBody`]), one log line, one metric report and, for
//! server-class statuses, an alarm.
//!
//! | Variant | Status |
//! |---|---|
//! | `Authentication` | 401 |
//! | `Authorization` | 403 |
//! | `Validation` | 400 |
//! | `Decode` | 400 |
//! | `Controller` | carried by the error |
//! | `Internal` | 500 |

use std::backtrace::{Backtrace, BacktraceStatus};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::Attributes;

/// Result alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Broad classification of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing, invalid or revoked credential.
    Authentication,
    /// Valid identity without the required permissions.
    Authorization,
    /// Malformed path or query value.
    Validation,
    /// Structured body could not be parsed.
    Decode,
    /// Failure reported by a controller or middleware.
    Controller,
    /// Broken invariant inside the dispatch layer.
    Internal,
}

impl ErrorCategory {
    /// Default HTTP status for the category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Validation | Self::Decode => StatusCode::BAD_REQUEST,
            Self::Controller | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error raised while dispatching a request.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use vestibule_core::DispatchError;
///
/// let err = DispatchError::controller(StatusCode::NOT_FOUND, "customer not found")
///     .with_code("CUS-0004")
///     .with_attr("customerId", 42);
///
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), Some("CUS-0004"));
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Credential missing, undecodable or revoked.
    #[error("{message}")]
    Authentication {
        /// Human-readable message.
        message: String,
        /// Stable machine-readable code.
        code: Option<String>,
        /// Extra attributes for logs and verbose bodies.
        attributes: Attributes,
        /// Underlying failure.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Identity lacks a required permission.
    #[error("{message}")]
    Authorization {
        /// Human-readable message.
        message: String,
        /// Identity attributes (user, role, perms) for audit logging.
        attributes: Attributes,
    },

    /// A path or query value failed to parse.
    #[error("{message}")]
    Validation {
        /// Human-readable message, usually the parse error text.
        message: String,
        /// Offending tag, raw value, kind.
        attributes: Attributes,
    },

    /// The request body could not be decoded.
    #[error("{message}")]
    Decode {
        /// Human-readable message.
        message: String,
        /// Underlying parse failure.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Business-logic failure with its own status.
    #[error("{message}")]
    Controller {
        /// Human-readable message.
        message: String,
        /// Response status.
        status: StatusCode,
        /// Stable machine-readable code.
        code: Option<String>,
        /// Extra attributes for logs and verbose bodies.
        attributes: Attributes,
        /// `Retry-After` value, honoured for 429 responses.
        retry_after: Option<String>,
        /// Underlying failure.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Internal invariant violation.
    #[error("{message}")]
    Internal {
        /// Human-readable message.
        message: String,
        /// Underlying failure.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Code of [`DispatchError::authorization_header_missed`].
    pub const CODE_HEADER_MISSED: &'static str = "VTL-0001";
    /// Code of [`DispatchError::access_token_revoked`].
    pub const CODE_TOKEN_REVOKED: &'static str = "VTL-0002";

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: None,
            attributes: Attributes::new(),
            source: None,
        }
    }

    /// The request carries no `Authorization` header.
    #[must_use]
    pub fn authorization_header_missed() -> Self {
        Self::authentication("header Authorization missed").with_code(Self::CODE_HEADER_MISSED)
    }

    /// The presented access token has been revoked.
    #[must_use]
    pub fn access_token_revoked() -> Self {
        Self::authentication("access token revoked").with_code(Self::CODE_TOKEN_REVOKED)
    }

    /// Creates an authorization (forbidden) error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            attributes: Attributes::new(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            attributes: Attributes::new(),
        }
    }

    /// Creates a body decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// The body is empty but structured data is required.
    #[must_use]
    pub fn empty_body() -> Self {
        Self::decode("empty request body, structured data expected")
    }

    /// Creates a controller error with an explicit status.
    #[must_use]
    pub fn controller(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Controller {
            message: message.into(),
            status,
            code: None,
            attributes: Attributes::new(),
            retry_after: None,
            source: None,
        }
    }

    /// Creates a 429 error with a `Retry-After` value.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>, retry_after: impl ToString) -> Self {
        match Self::controller(StatusCode::TOO_MANY_REQUESTS, message) {
            Self::Controller {
                message,
                status,
                code,
                attributes,
                source,
                ..
            } => Self::Controller {
                message,
                status,
                code,
                attributes,
                retry_after: Some(retry_after.to_string()),
                source,
            },
            other => other,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a machine-readable code. Ignored by variants without one.
    #[must_use]
    pub fn with_code(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Authentication { code, .. } | Self::Controller { code, .. } => {
                *code = Some(value.into());
            }
            _ => {}
        }
        self
    }

    /// Attaches an attribute. Ignored by `Decode` and `Internal`.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Some(attributes) = self.attributes_mut() {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Attaches the underlying failure. Ignored by `Authorization` and
    /// `Validation`.
    #[must_use]
    pub fn with_source(mut self, err: impl Into<anyhow::Error>) -> Self {
        match &mut self {
            Self::Authentication { source, .. }
            | Self::Decode { source, .. }
            | Self::Controller { source, .. }
            | Self::Internal { source, .. } => *source = Some(err.into()),
            _ => {}
        }
        self
    }

    /// Overrides the status of a controller error, or turns any other
    /// variant into a controller error with the same message.
    #[must_use]
    pub fn with_status(self, status: StatusCode) -> Self {
        match self {
            Self::Controller {
                message,
                code,
                attributes,
                retry_after,
                source,
                ..
            } => Self::Controller {
                message,
                status,
                code,
                attributes,
                retry_after,
                source,
            },
            other => {
                let code = other.code().map(str::to_string);
                let attributes = other.attributes().cloned().unwrap_or_default();
                let message = other.to_string();
                Self::Controller {
                    message,
                    status,
                    code,
                    attributes,
                    retry_after: None,
                    source: Some(anyhow::Error::new(other)),
                }
            }
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Authorization { .. } => ErrorCategory::Authorization,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Controller { .. } => ErrorCategory::Controller,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// HTTP status for the response.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Controller { status, .. } => *status,
            other => other.category().default_status_code(),
        }
    }

    /// Machine-readable code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Authentication { code, .. } | Self::Controller { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Attributes carried by the error.
    #[must_use]
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Self::Authentication { attributes, .. }
            | Self::Authorization { attributes, .. }
            | Self::Validation { attributes, .. }
            | Self::Controller { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    fn attributes_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Self::Authentication { attributes, .. }
            | Self::Authorization { attributes, .. }
            | Self::Validation { attributes, .. }
            | Self::Controller { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// `Retry-After` value, only meaningful for 429 responses.
    #[must_use]
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::Controller { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    /// Messages of the wrapped error chain, outermost first.
    #[must_use]
    pub fn chain(&self) -> Vec<String> {
        let mut prev = Vec::new();
        let mut next = std::error::Error::source(self);
        while let Some(err) = next {
            prev.push(err.to_string());
            next = err.source();
        }
        prev
    }

    /// Stack trace of the failure.
    ///
    /// Uses the trace the wrapped `anyhow` source captured when it was
    /// created (requires `RUST_BACKTRACE`), otherwise captures the current
    /// stack, which is the dispatch path that reported the error.
    #[must_use]
    pub fn stack(&self) -> String {
        let captured = self
            .source_error()
            .map(anyhow::Error::backtrace)
            .filter(|bt| bt.status() == BacktraceStatus::Captured);
        match captured {
            Some(bt) => bt.to_string(),
            None => Backtrace::force_capture().to_string(),
        }
    }

    fn source_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Authentication { source, .. }
            | Self::Decode { source, .. }
            | Self::Controller { source, .. }
            | Self::Internal { source, .. } => source.as_ref(),
            _ => None,
        }
    }

    /// Builds the client-facing body. Verbose bodies add the wrapped chain,
    /// the error attributes and the stack trace.
    #[must_use]
    pub fn to_body(&self, verbose: bool) -> ErrorBody {
        if !verbose {
            return ErrorBody {
                message: self.to_string(),
                code: self.code().map(str::to_string),
                prev: Vec::new(),
                fields: Attributes::new(),
                stack: None,
            };
        }
        ErrorBody {
            message: self.to_string(),
            code: self.code().map(str::to_string),
            prev: self.chain(),
            fields: self.attributes().cloned().unwrap_or_default(),
            stack: Some(self.stack()),
        }
    }

    /// Full server-side representation used in logs and alarms.
    #[must_use]
    pub fn server_json(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("message".into(), Value::String(self.to_string()));
        obj.insert(
            "category".into(),
            serde_json::to_value(self.category()).unwrap_or(Value::Null),
        );
        obj.insert("status".into(), Value::from(self.status_code().as_u16()));
        if let Some(code) = self.code() {
            obj.insert("code".into(), Value::String(code.to_string()));
        }
        if let Some(attributes) = self.attributes().filter(|a| !a.is_empty()) {
            obj.insert(
                "fields".into(),
                Value::Object(attributes.clone().into_iter().collect()),
            );
        }
        let prev = self.chain();
        if !prev.is_empty() {
            obj.insert("prev".into(), Value::from(prev));
        }
        Value::Object(obj)
    }
}

/// JSON body written for failed requests.
///
/// ```json
/// {"message":"header Authorization missed","code":"VTL-0001"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message.
    pub message: String,
    /// Machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Wrapped error messages, verbose mode only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prev: Vec<String>,
    /// Error attributes, verbose mode only.
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub fields: Attributes,
    /// Stack trace, verbose mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(
            DispatchError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(DispatchError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            DispatchError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DispatchError::empty_body().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            DispatchError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_well_known_errors() {
        let missed = DispatchError::authorization_header_missed();
        assert_eq!(missed.to_string(), "header Authorization missed");
        assert_eq!(missed.code(), Some("VTL-0001"));
        assert_eq!(missed.status_code(), StatusCode::UNAUTHORIZED);

        let revoked = DispatchError::access_token_revoked();
        assert_eq!(revoked.to_string(), "access token revoked");
        assert_eq!(revoked.code(), Some("VTL-0002"));

        assert_eq!(
            DispatchError::empty_body().to_string(),
            "empty request body, structured data expected"
        );
    }

    #[test]
    fn test_body_is_terse_unless_verbose() {
        let err = DispatchError::controller(StatusCode::CONFLICT, "duplicate order")
            .with_code("ORD-0009")
            .with_attr("orderId", 12)
            .with_source(std::io::Error::new(std::io::ErrorKind::Other, "unique violation"));

        let body = serde_json::to_value(err.to_body(false)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "duplicate order", "code": "ORD-0009"})
        );

        let body = serde_json::to_value(err.to_body(true)).unwrap();
        assert_eq!(body["prev"], serde_json::json!(["unique violation"]));
        assert_eq!(body["fields"]["orderId"], 12);
        assert!(body["stack"].is_string());
    }

    #[test]
    fn test_verbose_body_carries_stack() {
        let err = DispatchError::internal("ledger unavailable");
        assert!(err.to_body(false).stack.is_none());

        let stack = err.to_body(true).stack.unwrap();
        assert!(!stack.is_empty());

        let wrapped = DispatchError::internal("ledger unavailable")
            .with_source(anyhow::anyhow!("connection reset"));
        assert!(wrapped.to_body(true).stack.is_some());
    }

    #[test]
    fn test_with_status_wraps_other_variants() {
        let err = DispatchError::validation("bad id").with_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.category(), ErrorCategory::Controller);
        assert_eq!(err.to_string(), "bad id");
    }

    #[test]
    fn test_too_many_requests_keeps_retry_after() {
        let err = DispatchError::too_many_requests("slow down", 30);
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.retry_after(), Some("30"));
    }

    #[test]
    fn test_server_json_has_everything() {
        let err = DispatchError::forbidden("forbidden")
            .with_attr("user", "robert")
            .with_attr("role", 2);
        let json = err.server_json();
        assert_eq!(json["status"], 403);
        assert_eq!(json["category"], "authorization");
        assert_eq!(json["fields"]["user"], "robert");
    }
}
