//! Endpoint registry.

use std::sync::Arc;

use vestibule_core::{
    Authorizer, DispatchError, PermissionManager, RequestContext, RequestDebugger, RevokeTokenChecker,
    TokenDecoder,
};
use vestibule_middleware::{Middleware, MiddlewareSet, Phase};

use crate::compiler::{compile, sort_endpoints, AuthWiring, CompileEnv};
use crate::endpoint::{Endpoint, Endpointer};
use crate::error::CompileError;
use crate::options::DispatchOptions;
use crate::routes::Routes;
use crate::toc::{TocController, TocEntries};

/// Collects endpoints, collaborators and middleware, then compiles them into
/// [`Routes`].
///
/// `GET /` is always declared and lists every compiled endpoint.
///
/// # Example
///
/// ```rust,ignore
/// let mut vestibule = Vestibule::new(DispatchOptions::new().with_url_prefix("/api"));
/// vestibule.set_authorizer(Arc::new(BitsetAuthorizer::new()));
/// vestibule.set_token_decoder(Arc::new(decoder));
/// vestibule.set_permission_manager(Arc::new(permissions));
/// vestibule.add(Endpoint::get("/orders/{id}", GetOrder::default).perm("orders:read"));
///
/// let routes = vestibule.build()?;
/// ```
pub struct Vestibule {
    options: DispatchOptions,
    auth: AuthWiring,
    middlewares: MiddlewareSet,
    endpoints: Vec<Endpoint>,
    toc: TocEntries,
}

impl std::fmt::Debug for Vestibule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vestibule")
            .field("options", &self.options)
            .field("endpoints", &self.endpoints)
            .field("middlewares", &self.middlewares)
            .field("authorization_disabled", &self.auth.disabled)
            .finish_non_exhaustive()
    }
}

impl Vestibule {
    /// Creates a registry holding only the table of contents.
    #[must_use]
    pub fn new(options: DispatchOptions) -> Self {
        let toc = TocEntries::default();
        let entries = Arc::clone(&toc);
        let index = Endpoint::get("/", move || TocController::new(Arc::clone(&entries)));
        Self {
            options,
            auth: AuthWiring::default(),
            middlewares: MiddlewareSet::new(),
            endpoints: vec![index],
            toc,
        }
    }

    /// Authorizer of permission-bearing endpoints.
    pub fn set_authorizer(&mut self, authorizer: Arc<dyn Authorizer>) -> &mut Self {
        self.auth.authorizer = Some(authorizer);
        self
    }

    /// Decoder of `Authorization` headers.
    pub fn set_token_decoder(&mut self, decoder: Arc<dyn TokenDecoder>) -> &mut Self {
        self.auth.token_decoder = Some(decoder);
        self
    }

    /// Resolver of permission names.
    pub fn set_permission_manager(&mut self, manager: Arc<dyn PermissionManager>) -> &mut Self {
        self.auth.permission_manager = Some(manager);
        self
    }

    /// Per-caller debug logging.
    pub fn set_request_debugger(&mut self, debugger: Arc<dyn RequestDebugger>) -> &mut Self {
        self.auth.request_debugger = Some(debugger);
        self
    }

    /// Checked before any token is decoded.
    pub fn set_revoke_token_checker(&mut self, checker: Arc<dyn RevokeTokenChecker>) -> &mut Self {
        self.auth.revoke_checker = Some(checker);
        self
    }

    /// Serves permission-bearing endpoints without authorization. Meant for
    /// local development.
    pub fn disable_authorizer(&mut self) -> &mut Self {
        self.auth.disabled = true;
        self
    }

    /// Appends middleware to `phase`.
    pub fn add_middleware<M: Middleware>(&mut self, phase: Phase, middleware: M) -> &mut Self {
        self.middlewares.add(phase, middleware);
        self
    }

    /// Appends a synchronous closure to `phase`.
    pub fn add_middleware_fn<F>(&mut self, phase: Phase, name: &'static str, f: F) -> &mut Self
    where
        F: Fn(&mut RequestContext) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        self.middlewares.add_fn(phase, name, f);
        self
    }

    /// Declares endpoints.
    pub fn add(&mut self, endpoints: impl Endpointer) -> &mut Self {
        self.endpoints.extend(endpoints.endpoints());
        self
    }

    /// Declared endpoints, including `GET /`.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Dispatch options.
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Compiles every endpoint. The first failure aborts the pass.
    pub fn build(self) -> Result<Routes, CompileError> {
        let Self {
            options,
            auth,
            middlewares,
            mut endpoints,
            toc,
        } = self;

        sort_endpoints(&mut endpoints);
        let env = CompileEnv::new(&auth, &options, Arc::new(middlewares));
        let compiled = endpoints
            .into_iter()
            .map(|ep| compile(ep, &env))
            .collect::<Result<Vec<_>, _>>()?;

        let routes = Routes::new(compiled)?;
        let lines = routes
            .endpoints()
            .iter()
            .map(|ep| format!("{} {}", ep.method(), ep.path()))
            .collect();
        let _ = toc.set(lines);
        Ok(routes)
    }

    /// Like [`build`](Self::build), for startup code where a bad endpoint
    /// table is fatal.
    ///
    /// # Panics
    ///
    /// Panics with the compile error message.
    #[must_use]
    pub fn must_build(self) -> Routes {
        match self.build() {
            Ok(routes) => routes,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Default for Vestibule {
    fn default() -> Self {
        Self::new(DispatchOptions::default())
    }
}
