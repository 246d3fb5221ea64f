//! Radix tree router for Vestibule.
//!
//! The router maps `(method, path pattern)` pairs to an arbitrary value,
//! usually the slot of a compiled endpoint. Matching is done segment by
//! segment over a compressed trie, so lookup cost depends on the path length
//! rather than on the number of registered routes.
//!
//! # Patterns
//!
//! - static segments: `/customers`
//! - named parameters: `/customers/{id}`
//! - catch-all wildcards as the last segment: `/files/*path`
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use vestibule_router::Router;
//!
//! let mut router = Router::new();
//! router.insert(&Method::GET, "/customers", 0).unwrap();
//! router.insert(&Method::GET, "/customers/{id}", 1).unwrap();
//!
//! let found = router.match_route(&Method::GET, "/customers/42").unwrap();
//! assert_eq!(*found.value, 1);
//! assert_eq!(found.params.get("id"), Some("42"));
//! ```
//!
//! Static segments win over parameters, and parameters win over wildcards:
//!
//! ```text
//!                 (root)
//!                   │
//!             "customers"
//!              │       │
//!           (leaf)   "{id}"
//!          [GET]       │
//!                   (leaf)
//!                   [GET, PUT]
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use method_router::MethodRouter;
pub use node::{has_placeholder, Node, SegmentKind};
pub use params::Params;
pub use router::Router;

/// A matched route: the registered value plus the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// Value registered for the method and path pattern.
    pub value: &'a T,
    /// Captured path parameters.
    pub params: Params,
}

impl<'a, T> RouteMatch<'a, T> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(value: &'a T, params: Params) -> Self {
        Self { value, params }
    }
}
