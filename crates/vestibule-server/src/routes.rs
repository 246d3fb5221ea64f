//! Built route table.

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::ALLOW;
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::Full;
use vestibule_core::{DispatchError, LogOptionHandle, RequestContext, ResponseState};
use vestibule_router::Router;

use crate::compiler::CompiledEndpoint;
use crate::compression::{accepts_gzip, gzip_response};
use crate::error::CompileError;

/// Compiled endpoints behind a router. Immutable once built; share it with
/// an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let routes = registry.build()?;
/// routes
///     .log_options(&Method::GET, "/api/orders")
///     .expect("declared")
///     .store(LogOption::FULL);
/// ```
pub struct Routes {
    router: Router<usize>,
    endpoints: Vec<CompiledEndpoint>,
}

impl std::fmt::Debug for Routes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Routes")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl Routes {
    /// Registers compiled endpoints in order.
    pub(crate) fn new(endpoints: Vec<CompiledEndpoint>) -> Result<Self, CompileError> {
        let mut router = Router::new();
        for (index, ep) in endpoints.iter().enumerate() {
            router
                .insert(&ep.method, &ep.path, index)
                .map_err(|source| CompileError::Route {
                    method: ep.method.clone(),
                    path: ep.declared_path.clone(),
                    source,
                })?;
            tracing::info!(method = %ep.method, path = %ep.path, "handler registered");
        }
        Ok(Self { router, endpoints })
    }

    /// Compiled endpoints in registration order (path, then method).
    pub fn endpoints(&self) -> &[CompiledEndpoint] {
        &self.endpoints
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Live log option of the endpoint at `method` and `path` (including the
    /// URL prefix). Stores take effect on the next request unless static
    /// logging is configured.
    pub fn log_options(&self, method: &Method, path: &str) -> Option<LogOptionHandle> {
        self.endpoints
            .iter()
            .find(|ep| ep.method == method && ep.path == path)
            .map(|ep| ep.log_options.clone())
    }

    /// Dispatches one request. Unknown paths get 404, known paths with an
    /// undeclared method get 405 with an `Allow` header.
    pub async fn handle(&self, request: Request<Bytes>, remote_addr: Option<SocketAddr>) -> Response<Full<Bytes>> {
        let (parts, body) = request.into_parts();

        let matched = self
            .router
            .match_route(&parts.method, parts.uri.path())
            .map(|m| (*m.value, m.params));
        let Some((index, params)) = matched else {
            let allowed = self.router.allowed_methods(parts.uri.path());
            return if allowed.is_empty() {
                not_found()
            } else {
                method_not_allowed(&allowed)
            };
        };
        let ep = &self.endpoints[index];

        let mut ctx = RequestContext::new(parts.method, parts.uri)
            .with_headers(parts.headers)
            .with_body(body);
        if let Some(addr) = remote_addr {
            ctx = ctx.with_remote_addr(addr);
        }
        ctx.set_params(params);

        ep.dispatch(&mut ctx).await;

        let mut response = ctx.take_response();
        if ep.compress && accepts_gzip(ctx.headers()) {
            if let Err(e) = gzip_response(&mut response) {
                tracing::warn!(path = %ep.path, error = %e, "response compression failed");
            }
        }
        into_response(response)
    }
}

fn into_response(state: ResponseState) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(state.body)));
    *response.status_mut() = state.status;
    *response.headers_mut() = state.headers;
    response
}

/// JSON error response outside any endpoint: unknown routes, oversized
/// bodies.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::to_vec(&DispatchError::controller(status, message).to_body(false)).unwrap_or_default();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    response
}

fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "not found")
}

fn method_not_allowed(allowed: &[Method]) -> Response<Full<Bytes>> {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    let mut names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
    names.sort_unstable();
    if let Ok(value) = HeaderValue::from_str(&names.join(", ")) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use vestibule_core::{DispatchResult, LogOption};
    use vestibule_middleware::{BoxFuture, MiddlewareSet};

    use crate::compiler::{compile, AuthWiring, CompileEnv};
    use crate::controller::{Controller, Output};
    use crate::endpoint::Endpoint;
    use crate::options::DispatchOptions;

    #[derive(Default)]
    struct Pong {
        out: Vec<String>,
    }

    impl Controller for Pong {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async move {
                self.out = vec!["pong".to_string(); 64];
                Ok(())
            })
        }

        fn result(&self) -> Option<&dyn Output> {
            Some(&self.out)
        }
    }

    fn routes(eps: Vec<Endpoint>) -> Routes {
        let options = DispatchOptions::new().with_url_prefix("/api");
        let auth = AuthWiring::default();
        let env = CompileEnv::new(&auth, &options, Arc::new(MiddlewareSet::new()));
        let compiled = eps.into_iter().map(|ep| compile(ep, &env).unwrap()).collect();
        Routes::new(compiled).unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
    }

    async fn body(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_dispatches_matched_route() {
        let routes = routes(vec![Endpoint::get("/ping", Pong::default)]);
        let response = routes.handle(request(Method::GET, "/api/ping"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body(response).await;
        assert!(body.starts_with(br#"["pong","#));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let routes = routes(vec![
            Endpoint::get("/ping", Pong::default),
            Endpoint::delete("/ping", Pong::default),
        ]);

        let response = routes.handle(request(Method::GET, "/api/missing"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = routes.handle(request(Method::PUT, "/api/ping"), None).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "DELETE, GET");
        assert_eq!(body(response).await, r#"{"message":"method not allowed"}"#);
    }

    #[tokio::test]
    async fn test_compressed_endpoint() {
        let routes = routes(vec![Endpoint::get("/ping", Pong::default).compress()]);

        let mut req = request(Method::GET, "/api/ping");
        req.headers_mut()
            .insert(http::header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        let response = routes.handle(req, None).await;
        assert_eq!(response.headers().get(http::header::CONTENT_ENCODING).unwrap(), "gzip");

        let response = routes.handle(request(Method::GET, "/api/ping"), None).await;
        assert!(response.headers().get(http::header::CONTENT_ENCODING).is_none());
    }

    #[test]
    fn test_duplicate_route_is_compile_error() {
        let options = DispatchOptions::new();
        let auth = AuthWiring::default();
        let env = CompileEnv::new(&auth, &options, Arc::new(MiddlewareSet::new()));
        let compiled = vec![
            compile(Endpoint::get("/ping", Pong::default), &env).unwrap(),
            compile(Endpoint::get("/ping/", Pong::default), &env).unwrap(),
        ];
        let err = Routes::new(compiled).unwrap_err();
        assert!(matches!(err, CompileError::Route { .. }));
        assert_eq!(err.path(), "/ping/");
    }

    #[test]
    fn test_log_options_handle() {
        let routes = routes(vec![Endpoint::get("/ping", Pong::default)]);
        let handle = routes.log_options(&Method::GET, "/api/ping").unwrap();
        handle.store(LogOption::FULL);
        assert_eq!(
            routes.log_options(&Method::GET, "/api/ping").unwrap().load(),
            LogOption::FULL
        );
        assert!(routes.log_options(&Method::POST, "/api/ping").is_none());
        assert_eq!(routes.len(), 1);
    }
}
