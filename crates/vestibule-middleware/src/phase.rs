//! Pipeline phases.

use std::fmt;

/// Point of the dispatch pipeline at which middleware runs.
///
/// ```text
/// BeforeAuthorization -> authorization -> decoding -> AfterAuthorization
///     -> controller -> response -> OnSuccessResponse
///
/// any failure -> error response -> OnErrorResponse
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before the credential is checked.
    BeforeAuthorization,
    /// After authorization and input decoding, before the controller.
    AfterAuthorization,
    /// After a successful response has been written. Failures are logged
    /// only.
    OnSuccessResponse,
    /// After an error response has been prepared. Failures are logged only.
    OnErrorResponse,
}

impl Phase {
    /// All phases in pipeline order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [
            Self::BeforeAuthorization,
            Self::AfterAuthorization,
            Self::OnSuccessResponse,
            Self::OnErrorResponse,
        ]
    }

    /// Stable name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeAuthorization => "before_authorization",
            Self::AfterAuthorization => "after_authorization",
            Self::OnSuccessResponse => "on_success_response",
            Self::OnErrorResponse => "on_error_response",
        }
    }

    /// Returns true if failures in this phase can still change the response.
    #[must_use]
    pub const fn can_abort(self) -> bool {
        matches!(self, Self::BeforeAuthorization | Self::AfterAuthorization)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::BeforeAuthorization => 0,
            Self::AfterAuthorization => 1,
            Self::OnSuccessResponse => 2,
            Self::OnErrorResponse => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
