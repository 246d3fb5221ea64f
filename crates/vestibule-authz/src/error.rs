//! Error types for the authorization crate.

use thiserror::Error;

/// Result type for authorization setup.
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Errors raised while building authorization collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthzError {
    /// A permission name was registered twice.
    #[error("permission {name} is already registered")]
    DuplicatePermission {
        /// Permission name.
        name: String,
    },

    /// Two permissions claim the same bit.
    #[error("bit position {position} of permission {name} is already used by {existing}")]
    PositionTaken {
        /// Contested bit position.
        position: u32,
        /// Permission being registered.
        name: String,
        /// Permission that owns the bit.
        existing: String,
    },

    /// A permission table document could not be parsed.
    #[error("invalid permission table: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthzError {
    /// Create a duplicate permission error.
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicatePermission { name: name.into() }
    }

    /// Check if the error names a conflicting registration.
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::DuplicatePermission { .. } | Self::PositionTaken { .. }
        )
    }
}
