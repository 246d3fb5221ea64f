//! # Vestibule Core
//!
//! Foundational types shared by every Vestibule crate:
//!
//! - [`DispatchError`] - request-scoped error taxonomy and its JSON body
//! - [`RequestContext`] - per-request state: request data, the log attribute
//!   bag, the authenticated token payload and the response being built
//! - [`FormFile`] - files uploaded with `multipart/form-data`
//! - [`LogOption`] / [`LogOptionHandle`] - logging verbosity bitmask and its
//!   lock-free shared handle
//! - collaborator contracts ([`Authorizer`], [`TokenDecoder`],
//!   [`PermissionManager`], [`RevokeTokenChecker`], [`RequestDebugger`],
//!   [`Alarmer`], [`MetricReporter`]) and the token traits they exchange

#![doc(html_root_url = "https://docs.rs/vestibule-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod collaborator;
mod context;
mod error;
mod log_option;
mod multipart;
mod token;

pub use collaborator::{
    Alarmer, Authorizer, MetricReporter, PermissionManager, RequestDebugger, RevokeTokenChecker,
    TokenDecoder,
};
pub use context::{RequestContext, RequestId, ResponseState};
pub use error::{DispatchError, DispatchResult, ErrorBody, ErrorCategory};
pub use log_option::{LogOption, LogOptionHandle, ParseLogOptionError};
pub use multipart::FormFile;
pub use token::{Token, TokenPayload};

/// Ordered key/value attributes attached to log lines and errors.
pub type Attributes = indexmap::IndexMap<String, serde_json::Value>;
