//! Ordered middleware per phase.

use std::sync::Arc;

use thiserror::Error;
use vestibule_core::{DispatchError, RequestContext};

use crate::middleware::{FnMiddleware, Middleware};
use crate::phase::Phase;

/// Failure of one middleware, with where it happened.
#[derive(Debug, Error)]
#[error("middleware {name} failed in {phase}: {source}")]
pub struct MiddlewareError {
    /// Middleware name.
    pub name: &'static str,
    /// Phase it ran in.
    pub phase: Phase,
    /// The error it returned.
    #[source]
    pub source: DispatchError,
}

impl MiddlewareError {
    /// Returns the underlying dispatch error.
    #[must_use]
    pub fn into_inner(self) -> DispatchError {
        self.source
    }
}

/// Middleware registered per [`Phase`], run in registration order.
///
/// Built at setup time and shared read-only by every compiled endpoint.
///
/// # Example
///
/// ```
/// use vestibule_middleware::{MiddlewareSet, Phase};
///
/// let mut set = MiddlewareSet::new();
/// set.add_fn(Phase::BeforeAuthorization, "first", |_| Ok(()));
/// set.add_fn(Phase::BeforeAuthorization, "second", |_| Ok(()));
///
/// let names: Vec<_> = set.get(Phase::BeforeAuthorization).iter().map(|m| m.name()).collect();
/// assert_eq!(names, ["first", "second"]);
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareSet {
    phases: [Vec<Arc<dyn Middleware>>; 4],
}

impl std::fmt::Debug for MiddlewareSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for phase in Phase::all() {
            let names: Vec<_> = self.get(phase).iter().map(|m| m.name()).collect();
            map.entry(&phase.name(), &names);
        }
        map.finish()
    }
}

impl MiddlewareSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `middleware` to `phase`.
    pub fn add<M: Middleware>(&mut self, phase: Phase, middleware: M) {
        self.phases[phase.index()].push(Arc::new(middleware));
    }

    /// Appends an already shared middleware to `phase`.
    pub fn add_shared(&mut self, phase: Phase, middleware: Arc<dyn Middleware>) {
        self.phases[phase.index()].push(middleware);
    }

    /// Appends a synchronous closure to `phase`.
    pub fn add_fn<F>(&mut self, phase: Phase, name: &'static str, f: F)
    where
        F: Fn(&mut RequestContext) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        self.add(phase, FnMiddleware::new(name, f));
    }

    /// Middleware of `phase` in registration order.
    #[must_use]
    pub fn get(&self, phase: Phase) -> &[Arc<dyn Middleware>] {
        &self.phases[phase.index()]
    }

    /// Total number of registered middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Vec::is_empty)
    }

    /// Runs the middleware of `phase`, stopping at the first failure.
    pub async fn run(&self, phase: Phase, ctx: &mut RequestContext) -> Result<(), MiddlewareError> {
        for middleware in self.get(phase) {
            if let Err(source) = middleware.call(ctx).await {
                tracing::debug!(
                    middleware = middleware.name(),
                    phase = phase.name(),
                    error = %source,
                    "middleware aborted request"
                );
                return Err(MiddlewareError {
                    name: middleware.name(),
                    phase,
                    source,
                });
            }
        }
        Ok(())
    }
}
