//! # Vestibule Extract
//!
//! Decodes untyped request data into typed destination structures.
//!
//! | Source | Entry point | Field contract |
//! |--------|-------------|----------------|
//! | URL path | [`ParamSchema::decode_path`] | [`PathValue`] |
//! | Query string | [`ParamSchema::decode_query`] | [`QueryValue`] |
//! | Request body | [`decode_body`] | `serde::Deserialize` |
//!
//! `ParamSchema` is normally derived:
//!
//! ```rust,ignore
//! use vestibule::Params;
//!
//! #[derive(Default, Params)]
//! struct ListFilter {
//!     #[param("id")]
//!     id: i64,
//!     #[param("deletedOnly")]
//!     deleted_only: bool,
//!     #[param("day")]
//!     day: Date,
//!     #[param(nested)]
//!     paging: Paging,
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is an [`ExtractionError`] that records the source, the
//! offending tag and raw value, and converts into the matching
//! `DispatchError` category: parse failures and unsupported field types are
//! validation errors, body problems are decode errors.

#![doc(html_root_url = "https://docs.rs/vestibule-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod date;
mod error;
mod query;
mod schema;
mod value;

pub use body::{decode_body, decode_body_into};
pub use date::{Date, ParseDateError};
pub use error::{ExtractionError, ExtractionSource};
pub use query::QueryArgs;
pub use schema::{assign_path, assign_query, decode_path_params, ParamSchema};
pub use value::{parse_bool, PathValue, QueryValue, ValueError};
pub use vestibule_router::Params;
