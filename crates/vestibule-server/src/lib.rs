//! # Vestibule Server
//!
//! Endpoint compiler, per-request dispatch pipeline and HTTP/1.1 server.
//!
//! - [`Vestibule`] collects [`Endpoint`] declarations, collaborators and
//!   middleware, then [`build`](Vestibule::build)s them into [`Routes`]
//! - every endpoint is validated and resolved once into a
//!   [`CompiledEndpoint`]: permissions to bit positions, facets to
//!   [`Capabilities`], masking metadata to field trees
//! - [`Routes::handle`] runs the pipeline for one request: middleware,
//!   authorization, input decoding, the controller, result writing, logging,
//!   metrics and alarms
//! - [`Server`] serves the routes with graceful shutdown
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vestibule_server::{DispatchOptions, Endpoint, Server, ServerConfig, Vestibule};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut vestibule = Vestibule::new(DispatchOptions::new().with_url_prefix("/api"));
//!     vestibule.set_authorizer(Arc::new(authorizer));
//!     vestibule.set_token_decoder(Arc::new(decoder));
//!     vestibule.set_permission_manager(Arc::new(permissions));
//!     vestibule.add(Endpoint::get("/customers/{id}", GetCustomer::default).perm("customers:read"));
//!
//!     let server = Server::new(ServerConfig::default(), vestibule.build()?);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compiler;
mod compression;
mod controller;
mod description;
mod dispatcher;
mod endpoint;
mod error;
mod options;
mod registry;
mod routes;
mod server;
pub mod shutdown;
mod toc;

pub use compiler::{CompiledEndpoint, InputSource, DEFAULT_CONTENT_TYPE};
pub use controller::{Capabilities, Controller, ControllerFactory, Input, Output};
pub use endpoint::{Endpoint, Endpointer};
pub use error::{CompileError, ServerError};
pub use options::DispatchOptions;
pub use registry::Vestibule;
pub use routes::Routes;
pub use server::{
    Server, ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use shutdown::ShutdownSignal;
pub use vestibule_middleware::BoxFuture;
