//! Route registration errors.

use thiserror::Error;

/// Error returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path pattern is malformed.
    #[error("invalid path pattern {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The same method is already registered for the pattern.
    #[error("route {method} {pattern} is already registered")]
    Duplicate {
        /// HTTP method.
        method: String,
        /// Path pattern.
        pattern: String,
    },

    /// Two patterns use different parameter names at the same position.
    #[error("parameter {{{name}}} in {pattern} conflicts with existing parameter {{{existing}}}")]
    ParamConflict {
        /// Path pattern being inserted.
        pattern: String,
        /// Parameter name in the new pattern.
        name: String,
        /// Parameter name already registered at that position.
        existing: String,
    },
}

impl RouteError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
