//! # Vestibule Middleware
//!
//! Cross-cutting request steps that run at fixed points of the dispatch
//! pipeline.
//!
//! ## Phases
//!
//! | Phase | Runs | On failure |
//! |-------|------|------------|
//! | [`Phase::BeforeAuthorization`] | before the credential check | error response |
//! | [`Phase::AfterAuthorization`] | after input decoding, before the controller | error response |
//! | [`Phase::OnSuccessResponse`] | after the response is written | logged (and alarmed when server-class) |
//! | [`Phase::OnErrorResponse`] | after an error response is prepared | logged |
//!
//! Within a phase middleware runs in registration order and the first
//! failure stops the phase.
//!
//! ## Example
//!
//! ```
//! use vestibule_core::DispatchError;
//! use vestibule_middleware::{MiddlewareSet, Phase, RequestIdMiddleware};
//!
//! let mut set = MiddlewareSet::new();
//! set.add(Phase::BeforeAuthorization, RequestIdMiddleware::new());
//! set.add_fn(Phase::AfterAuthorization, "maintenance", |_ctx| {
//!     Err(DispatchError::controller(http::StatusCode::SERVICE_UNAVAILABLE, "maintenance"))
//! });
//! assert_eq!(set.len(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod middleware;
mod phase;
mod set;
pub mod stages;

pub use middleware::{BoxFuture, FnMiddleware, Middleware};
pub use phase::Phase;
pub use set::{MiddlewareError, MiddlewareSet};
pub use stages::RequestIdMiddleware;
