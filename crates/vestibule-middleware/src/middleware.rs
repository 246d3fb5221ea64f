//! Core middleware trait and types.
//!
//! Middleware runs at one of the fixed [`Phase`](crate::Phase)s of the
//! dispatch pipeline. It receives the request context and either lets the
//! pipeline continue (`Ok(())`) or aborts it with a [`DispatchError`], which
//! the dispatcher turns into an error response exactly as if a controller had
//! returned it.
//!
//! # Example
//!
//! ```
//! use vestibule_core::{DispatchError, RequestContext};
//! use vestibule_middleware::{BoxFuture, Middleware};
//!
//! struct RequireTenant;
//!
//! impl Middleware for RequireTenant {
//!     fn name(&self) -> &'static str {
//!         "require-tenant"
//!     }
//!
//!     fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), DispatchError>> {
//!         Box::pin(async move {
//!             let tenant = ctx
//!                 .header("x-tenant")
//!                 .ok_or_else(|| DispatchError::validation("header X-Tenant missed"))?
//!                 .to_string();
//!             ctx.log("tenant", tenant);
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use vestibule_core::{DispatchError, RequestContext};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A pipeline step run at a fixed phase.
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs the step. An error aborts the request.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), DispatchError>>;
}

/// Middleware built from a synchronous closure.
///
/// ```
/// use vestibule_middleware::FnMiddleware;
///
/// let mw = FnMiddleware::new("stamp", |ctx| {
///     ctx.log("stamped", true);
///     Ok(())
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    f: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&mut RequestContext) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    /// Wraps `f` under `name`.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish()
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut RequestContext) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), DispatchError>> {
        let result = (self.f)(ctx);
        Box::pin(std::future::ready(result))
    }
}
