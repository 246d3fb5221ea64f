//! Extraction error types.
//!
//! This module provides the error raised while decoding path parameters,
//! query strings and request bodies, together with the source it came from.

use std::fmt;

use http::StatusCode;
use vestibule_core::DispatchError;

/// Where the value was being decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    /// Path parameters (e.g., `/customers/{id}`)
    Path,
    /// Query string parameters
    Query,
    /// Request body
    Body,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtractionErrorKind {
    /// Value failed to parse into the field type
    InvalidValue,
    /// Field type cannot be decoded from this source
    Unsupported,
    /// Body required but empty
    EmptyBody,
    /// Body or query string is not well formed
    DeserializationFailed,
    /// The router produced no value for a declared path key
    MissingPathValue,
}

/// Error that occurs while decoding request data into a typed value.
///
/// # Example
///
/// ```rust
/// use http::StatusCode;
/// use vestibule_extract::{ExtractionError, ExtractionSource};
///
/// let err = ExtractionError::invalid_value(ExtractionSource::Query, "id", "x1", "invalid digit found in string");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.field(), Some("id"));
/// assert_eq!(err.to_string(), "invalid digit found in string");
/// ```
#[derive(Debug)]
pub struct ExtractionError {
    extraction_source: ExtractionSource,
    kind: ExtractionErrorKind,
    field: Option<String>,
    value: Option<String>,
    type_kind: Option<&'static str>,
    message: String,
    cause: Option<serde_json::Error>,
}

impl ExtractionError {
    fn new(source: ExtractionSource, kind: ExtractionErrorKind, message: impl Into<String>) -> Self {
        Self {
            extraction_source: source,
            kind,
            field: None,
            value: None,
            type_kind: None,
            message: message.into(),
            cause: None,
        }
    }

    /// A value failed to parse. `details` is the parser's own message.
    #[must_use]
    pub fn invalid_value(
        source: ExtractionSource,
        field: impl Into<String>,
        value: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            value: Some(value.into()),
            ..Self::new(source, ExtractionErrorKind::InvalidValue, details)
        }
    }

    /// The field type cannot be decoded from `source`.
    #[must_use]
    pub fn unsupported(
        source: ExtractionSource,
        field: impl Into<String>,
        value: impl Into<String>,
        type_kind: &'static str,
    ) -> Self {
        Self {
            field: Some(field.into()),
            value: Some(value.into()),
            type_kind: Some(type_kind),
            ..Self::new(source, ExtractionErrorKind::Unsupported, "unsupported type")
        }
    }

    /// The request body is empty.
    #[must_use]
    pub fn empty_body() -> Self {
        Self::new(
            ExtractionSource::Body,
            ExtractionErrorKind::EmptyBody,
            "empty request body, structured data expected",
        )
    }

    /// The body is not valid for the destination type.
    #[must_use]
    pub fn body(err: serde_json::Error) -> Self {
        Self {
            cause: Some(err),
            ..Self::new(
                ExtractionSource::Body,
                ExtractionErrorKind::DeserializationFailed,
                "invalid request body",
            )
        }
    }

    /// The query string is not well formed.
    #[must_use]
    pub fn malformed_query(details: impl fmt::Display) -> Self {
        Self::new(
            ExtractionSource::Query,
            ExtractionErrorKind::DeserializationFailed,
            format!("malformed query string: {details}"),
        )
    }

    /// A declared path key has no matched segment.
    #[must_use]
    pub fn missing_path_value(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("path parameter {field} was not captured by the route"),
            field: Some(field),
            ..Self::new(ExtractionSource::Path, ExtractionErrorKind::MissingPathValue, "")
        }
    }

    /// Returns the extraction source.
    #[must_use]
    pub fn extraction_source(&self) -> ExtractionSource {
        self.extraction_source
    }

    /// Returns the tag of the offending field.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the raw value that failed.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns true if the body was empty.
    #[must_use]
    pub fn is_empty_body(&self) -> bool {
        self.kind == ExtractionErrorKind::EmptyBody
    }

    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ExtractionErrorKind::InvalidValue
            | ExtractionErrorKind::Unsupported
            | ExtractionErrorKind::EmptyBody
            | ExtractionErrorKind::DeserializationFailed => StatusCode::BAD_REQUEST,
            ExtractionErrorKind::MissingPathValue => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {cause}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ExtractionError {}

impl From<ExtractionError> for DispatchError {
    fn from(err: ExtractionError) -> Self {
        let message = err.to_string();
        match err.kind {
            ExtractionErrorKind::InvalidValue | ExtractionErrorKind::Unsupported => {
                let mut out = DispatchError::validation(message)
                    .with_attr("source", err.extraction_source.to_string());
                if let Some(field) = err.field {
                    out = out.with_attr("tag", field);
                }
                if let Some(value) = err.value {
                    out = out.with_attr("val", value);
                }
                if let Some(kind) = err.type_kind {
                    out = out.with_attr("kind", kind);
                }
                out
            }
            ExtractionErrorKind::EmptyBody => DispatchError::empty_body(),
            ExtractionErrorKind::DeserializationFailed => match err.cause {
                Some(cause) => DispatchError::decode(message).with_source(cause),
                None => DispatchError::decode(message),
            },
            ExtractionErrorKind::MissingPathValue => DispatchError::internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestibule_core::ErrorCategory;

    #[test]
    fn test_invalid_value_becomes_validation() {
        let err = ExtractionError::invalid_value(
            ExtractionSource::Path,
            "id",
            "abc",
            "invalid digit found in string",
        );
        let err = DispatchError::from(err);
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.to_string(), "invalid digit found in string");
        let attrs = err.attributes().unwrap();
        assert_eq!(attrs["tag"], "id");
        assert_eq!(attrs["val"], "abc");
    }

    #[test]
    fn test_unsupported_carries_kind() {
        let err = ExtractionError::unsupported(ExtractionSource::Query, "ids", "1,2", "slice");
        assert_eq!(err.to_string(), "unsupported type");
        let err = DispatchError::from(err);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.attributes().unwrap()["kind"], "slice");
    }

    #[test]
    fn test_empty_body() {
        let err = ExtractionError::empty_body();
        assert!(err.is_empty_body());
        let err = DispatchError::from(err);
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert_eq!(err.to_string(), "empty request body, structured data expected");
    }

    #[test]
    fn test_body_error_keeps_cause() {
        let cause = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err = DispatchError::from(ExtractionError::body(cause));
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert_eq!(err.chain().len(), 1);
    }

    #[test]
    fn test_missing_path_value_is_internal() {
        let err = ExtractionError::missing_path_value("billNum");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            DispatchError::from(err).category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_extraction_source_display() {
        assert_eq!(ExtractionSource::Path.to_string(), "path");
        assert_eq!(ExtractionSource::Query.to_string(), "query");
        assert_eq!(ExtractionSource::Body.to_string(), "body");
    }
}
