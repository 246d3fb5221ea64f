//! Derive macros for Vestibule destination types.
//!
//! Controllers receive path parameters, query strings and bodies in plain
//! structs. Instead of reflecting over field tags at runtime, the structs
//! derive their schemas:
//!
//! - `#[derive(Params)]` implements `vestibule_extract::ParamSchema`, the
//!   field-by-field decoder for path parameters and query strings.
//! - `#[derive(Masked)]` implements `vestibule_mask::MaskSchema`, the masking
//!   metadata used to redact logged payloads.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde::Serialize;
//! use vestibule_macros::{Masked, Params};
//!
//! #[derive(Default, Params)]
//! struct BillPath {
//!     #[param("customerId")]
//!     customer_id: i64,
//!     #[param("billNum")]
//!     bill_num: String,
//! }
//!
//! #[derive(Serialize, Masked)]
//! #[serde(rename_all = "camelCase")]
//! struct Customer {
//!     id: i64,
//!     #[mask("email")]
//!     email: String,
//!     #[mask("-", audit = "")]
//!     notice: String,
//! }
//! ```
//!
//! Generated code refers to `::vestibule_extract` and `::vestibule_mask` by
//! default. Crates that only depend on the `vestibule` facade point the
//! derives at it with a container attribute:
//!
//! ```rust,ignore
//! #[derive(Default, Params)]
//! #[vestibule(crate = "vestibule")]
//! struct ById {
//!     #[param("id")]
//!     id: i64,
//! }
//! ```

mod masked;
mod params;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Tag used by `#[mask("...")]` without an explicit tag name.
const DEFAULT_TAG: &str = "mask";

/// Derives `ParamSchema`.
///
/// # Field attributes
///
/// - `#[param("key")]` or `#[param(name = "key")]`: assign the field from the
///   path segment or query value named `key`.
/// - `#[param(nested)]`: the field is itself a `ParamSchema`; query decoding
///   recurses into it with the same query string.
///
/// Fields without `#[param]` are left untouched.
///
/// # Container attributes
///
/// - `#[vestibule(crate = "path")]`: reach the runtime through the facade at
///   `path` instead of `::vestibule_extract`.
///
/// ```rust,ignore
/// #[derive(Default, Params)]
/// struct Filter {
///     #[param("id")]
///     id: i32,
///     #[param("deletedOnly")]
///     deleted_only: bool,
///     #[param(nested)]
///     paging: Paging,
/// }
/// ```
#[proc_macro_derive(Params, attributes(param, vestibule))]
pub fn derive_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    params::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derives `MaskSchema`.
///
/// Attribute names follow the serde attributes of the struct (`rename`,
/// `rename_all`, `skip`, `skip_serializing`, `flatten`, `transparent`).
///
/// # Field attributes
///
/// - `#[mask("fn")]`: directive for the default `mask` tag; `"-"` deletes the
///   attribute, any other value names a registered masking function.
/// - `#[mask(audit = "fn")]`: directive for another tag.
/// - `#[mask(skip)]`: leave the field out of the metadata.
/// - `#[mask(opaque)]`: do not look inside the field's type. Use it to break
///   recursive types.
///
/// # Container attributes
///
/// - `#[vestibule(crate = "path")]`: reach the runtime through the facade at
///   `path` instead of `::vestibule_mask`.
#[proc_macro_derive(Masked, attributes(mask, vestibule))]
pub fn derive_masked(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    masked::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
