//! # Vestibule
//!
//! **Endpoint dispatch for JSON HTTP services**
//!
//! Vestibule turns declarative endpoint descriptions into a validated route
//! table and runs every request through a fixed pipeline:
//!
//! - **Compiled endpoints**: permissions, path parameters, input sources and
//!   masking metadata are checked once at startup, never per request
//! - **Bitset authorization**: bearer tokens carry packed permission bits,
//!   endpoints require bit positions resolved from permission names
//! - **Masked request logging**: request and response bodies are logged with
//!   sensitive fields redacted, at a verbosity adjustable per endpoint while
//!   the service runs
//! - **Uniform errors**: one JSON error body, one metric per request, one
//!   alarm per server failure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vestibule::prelude::*;
//!
//! #[derive(Default, Params)]
//! #[vestibule(crate = "vestibule")]
//! struct OrderPath {
//!     #[param("id")]
//!     id: i64,
//! }
//!
//! #[derive(Default)]
//! struct GetOrder {
//!     path: OrderPath,
//!     out: Order,
//! }
//!
//! impl Controller for GetOrder {
//!     fn handle<'a>(&'a mut self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
//!         Box::pin(async move {
//!             self.out = load_order(self.path.id).await?;
//!             Ok(())
//!         })
//!     }
//!
//!     fn params(&mut self) -> Option<&mut dyn ParamSchema> {
//!         Some(&mut self.path)
//!     }
//!
//!     fn result(&self) -> Option<&dyn Output> {
//!         Some(&self.out)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("VESTIBULE").load()?;
//!     init_logging(&config.logging)?;
//!
//!     let mut vestibule = Vestibule::new(DispatchOptions::from_config(&config.dispatch));
//!     vestibule
//!         .set_authorizer(Arc::new(BitsetAuthorizer))
//!         .set_token_decoder(Arc::new(decoder))
//!         .set_permission_manager(Arc::new(PermissionTable::sequential(["orders:read"])?))
//!         .add(Endpoint::get("/orders/{id}", GetOrder::default).perm("orders:read"));
//!
//!     Server::new(ServerConfig::from_section(&config.server), vestibule.build()?)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Request → RequestId → BeforeAuthorization → Authorize → AfterAuthorization
//!         → decode path / query / body → Controller → write result
//!         → OnSuccessResponse | OnErrorResponse → log, metric, alarm
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use vestibule_authz as authz;
pub use vestibule_config as config;
pub use vestibule_core as core;
pub use vestibule_extract as extract;
pub use vestibule_mask as mask;
pub use vestibule_middleware as middleware;
pub use vestibule_router as router;
pub use vestibule_server as server;
pub use vestibule_telemetry as telemetry;

pub use vestibule_macros::{Masked, Params};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use vestibule::prelude::*;
/// ```
pub mod prelude {
    pub use vestibule_core::{
        Alarmer, Authorizer, DispatchError, DispatchResult, FormFile, LogOption, MetricReporter,
        PermissionManager, RequestContext, RequestDebugger, RevokeTokenChecker, Token,
        TokenDecoder, TokenPayload,
    };

    pub use vestibule_extract::{Date, ParamSchema};
    pub use vestibule_mask::{JsonMask, JsonMasker, MaskSchema};
    pub use vestibule_middleware::{Middleware, Phase};

    pub use vestibule_authz::{BitsetAuthorizer, PermissionTable, RevocationList, StaticRequestDebugger};
    pub use vestibule_config::{ConfigLoader, VestibuleConfig};
    pub use vestibule_telemetry::{init_logging, LogConfig, PrometheusReporter, TracingAlarmer};

    pub use vestibule_server::{
        BoxFuture, Controller, DispatchOptions, Endpoint, Endpointer, Input, Output, Routes,
        Server, ServerConfig, ShutdownSignal, Vestibule,
    };

    pub use vestibule_macros::{Masked, Params};
}
