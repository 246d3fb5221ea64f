//! # Vestibule Mask
//!
//! Redacts JSON payloads before they reach the logs.
//!
//! A type describes its serialized shape through [`MaskSchema`], usually via
//! `#[derive(Masked)]` from `vestibule-macros`. The description is a tree of
//! [`FieldMeta`] nodes: the serialized attribute name, the masking directive
//! selected by a tag, and the nested fields for objects and arrays of objects.
//!
//! [`JsonMask`] then rewrites an independent copy of the serialized bytes:
//!
//! | Directive | Effect |
//! |---|---|
//! | `""` | untouched |
//! | `"-"` | attribute deleted (from every element inside arrays) |
//! | any other name | the masking function registered under that name replaces the value; unregistered names are a no-op |
//!
//! The value that was serialized is never modified, so the wire response and
//! the logged copy stay independent.
//!
//! ## Example
//!
//! ```
//! use vestibule_mask::{FieldKind, FieldMeta, Fields, JsonMask, JsonMasker};
//!
//! let fields: Fields = [
//!     FieldMeta::new("email", "email", FieldKind::Scalar),
//!     FieldMeta::new("notice", "-", FieldKind::Scalar),
//! ]
//! .into_iter()
//! .collect();
//!
//! let masker = JsonMask::new().with_func("email", |_| "***".to_string());
//! let out = masker
//!     .mask(br#"{"id":1,"email":"a@b.c","notice":"long text"}"#, &fields)
//!     .unwrap();
//! assert_eq!(out, br#"{"id":1,"email":"***"}"#);
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-mask/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod field;
mod masker;
mod schema;

pub use error::MaskError;
pub use field::{FieldKind, FieldMeta, Fields};
pub use masker::{JsonMask, JsonMasker, MaskFn};
pub use schema::{MaskSchema, Maskable};

/// Directive that deletes an attribute.
pub const DELETE: &str = "-";

/// Tag read by default when computing masking metadata.
pub const DEFAULT_TAG: &str = "mask";
