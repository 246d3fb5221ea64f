//! Vestibule Authorization - reference collaborators
//!
//! Ready-to-use implementations of the authorization contracts defined in
//! `vestibule-core`:
//!
//! - [`BitsetAuthorizer`] - allows a caller whose packed permission bitset
//!   contains every bit an endpoint requires
//! - [`PermissionTable`] - fixed name to bit position mapping
//! - [`RevocationList`] - in-memory revoked token store
//! - [`StaticRequestDebugger`] - per-user or per-login debug logging
//!
//! # Example
//!
//! ```
//! use vestibule_authz::{pack_bits, BitsetAuthorizer, PermissionTable};
//! use vestibule_core::{Authorizer, PermissionManager};
//!
//! let table = PermissionTable::sequential(["orders:read", "orders:write"]).unwrap();
//! let required = [table.permission_bit_pos("orders:write").unwrap()];
//!
//! let caller = pack_bits(&[0, 1]);
//! assert!(BitsetAuthorizer.is_allowed(&caller, &required).unwrap());
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-authz/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bitset;
pub mod debugger;
pub mod error;
pub mod permission;
pub mod revocation;

pub use bitset::{has_bit, pack_bits, BitsetAuthorizer};
pub use debugger::{DebugSides, StaticRequestDebugger};
pub use error::{AuthzError, AuthzResult};
pub use permission::PermissionTable;
pub use revocation::RevocationList;
