//! Endpoint declarations.

use std::fmt;
use std::sync::Arc;

use http::{Method, StatusCode};
use vestibule_core::LogOption;

use crate::controller::{Controller, ControllerFactory};

/// A declared endpoint: method, path, permissions, controller factory and
/// per-endpoint options.
///
/// Declarations are plain data until the registry compiles them.
///
/// # Example
///
/// ```rust,ignore
/// use vestibule_server::Endpoint;
///
/// let ep = Endpoint::get("/customers/{id}", GetCustomer::default)
///     .perm("customers:read")
///     .log_options(LogOption::FULL)
///     .compress();
/// ```
#[derive(Clone)]
pub struct Endpoint {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) perms: Vec<String>,
    pub(crate) controller: ControllerFactory,
    pub(crate) response_content_type: Option<String>,
    pub(crate) log_options: LogOption,
    pub(crate) compress: bool,
    pub(crate) no_input_log: bool,
    pub(crate) no_result_log: bool,
    pub(crate) manual_status_code: bool,
    pub(crate) success_status_code: Option<StatusCode>,
    pub(crate) language_label: Option<String>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("perms", &self.perms)
            .field("log_options", &self.log_options)
            .field("compress", &self.compress)
            .finish_non_exhaustive()
    }
}

impl Endpoint {
    /// Declares an endpoint. `controller` is called once per request.
    pub fn new<F, C>(method: Method, path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        let factory: ControllerFactory = Arc::new(move || Box::new(controller()) as Box<dyn Controller>);
        Self {
            method,
            path: path.into(),
            perms: Vec::new(),
            controller: factory,
            response_content_type: None,
            log_options: LogOption::UNKNOWN,
            compress: false,
            no_input_log: false,
            no_result_log: false,
            manual_status_code: false,
            success_status_code: None,
            language_label: None,
        }
    }

    /// `GET` endpoint.
    pub fn get<F, C>(path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        Self::new(Method::GET, path, controller)
    }

    /// `POST` endpoint.
    pub fn post<F, C>(path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        Self::new(Method::POST, path, controller)
    }

    /// `PUT` endpoint.
    pub fn put<F, C>(path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        Self::new(Method::PUT, path, controller)
    }

    /// `PATCH` endpoint.
    pub fn patch<F, C>(path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        Self::new(Method::PATCH, path, controller)
    }

    /// `DELETE` endpoint.
    pub fn delete<F, C>(path: impl Into<String>, controller: F) -> Self
    where
        F: Fn() -> C + Send + Sync + 'static,
        C: Controller + 'static,
    {
        Self::new(Method::DELETE, path, controller)
    }

    /// Requires `name`. All required permissions must be granted.
    pub fn perm(mut self, name: impl Into<String>) -> Self {
        self.perms.push(name.into());
        self
    }

    /// Requires every permission of `names`.
    pub fn perms<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.perms.extend(names.into_iter().map(Into::into));
        self
    }

    /// Content type of successful responses, default
    /// `application/json; charset=utf-8`.
    pub fn response_content_type(mut self, value: impl Into<String>) -> Self {
        self.response_content_type = Some(value.into());
        self
    }

    /// Log verbosity. Unset endpoints take the registry default.
    pub fn log_options(mut self, lo: LogOption) -> Self {
        self.log_options = lo;
        self
    }

    /// Gzip the response for clients that accept it.
    pub fn compress(mut self) -> Self {
        self.compress = true;
        self
    }

    /// Never log the request body or decoded input.
    pub fn no_input_log(mut self) -> Self {
        self.no_input_log = true;
        self
    }

    /// Never log the result.
    pub fn no_result_log(mut self) -> Self {
        self.no_result_log = true;
        self
    }

    /// The controller sets the response status itself.
    pub fn manual_status_code(mut self) -> Self {
        self.manual_status_code = true;
        self
    }

    /// Status of successful responses, default 200.
    pub fn success_status_code(mut self, status: StatusCode) -> Self {
        self.success_status_code = Some(status);
        self
    }

    /// Opaque label shown in the endpoint description.
    pub fn language_label(mut self, label: impl Into<String>) -> Self {
        self.language_label = Some(label.into());
        self
    }

    /// HTTP method as declared.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as declared, without the URL prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Required permission names.
    pub fn permissions(&self) -> &[String] {
        &self.perms
    }

    /// Declared log option.
    pub fn log_option(&self) -> LogOption {
        self.log_options
    }

    /// Whether responses are compressed.
    pub fn is_compressed(&self) -> bool {
        self.compress
    }
}

/// A group of endpoints added in one call.
pub trait Endpointer {
    /// Endpoints to register.
    fn endpoints(&self) -> Vec<Endpoint>;
}

impl Endpointer for Endpoint {
    fn endpoints(&self) -> Vec<Endpoint> {
        vec![self.clone()]
    }
}

impl Endpointer for Vec<Endpoint> {
    fn endpoints(&self) -> Vec<Endpoint> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vestibule_core::{DispatchResult, RequestContext};
    use vestibule_middleware::BoxFuture;

    struct Ping;

    impl Controller for Ping {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct Module;

    impl Endpointer for Module {
        fn endpoints(&self) -> Vec<Endpoint> {
            vec![
                Endpoint::get("/ping", || Ping),
                Endpoint::delete("/ping", || Ping).perm("ping:delete"),
            ]
        }
    }

    #[test]
    fn test_builder_options() {
        let ep = Endpoint::post("/orders", || Ping)
            .perms(["orders:write", "orders:read"])
            .log_options(LogOption::FULL)
            .compress()
            .no_input_log()
            .success_status_code(StatusCode::CREATED)
            .language_label("ru");

        assert_eq!(*ep.method(), Method::POST);
        assert_eq!(ep.path(), "/orders");
        assert_eq!(ep.permissions(), ["orders:write", "orders:read"]);
        assert_eq!(ep.log_option(), LogOption::FULL);
        assert!(ep.is_compressed());
        assert!(ep.no_input_log);
        assert!(!ep.no_result_log);
        assert_eq!(ep.success_status_code, Some(StatusCode::CREATED));
        assert_eq!(ep.language_label.as_deref(), Some("ru"));
    }

    #[test]
    fn test_defaults() {
        let ep = Endpoint::get("/ping", || Ping);
        assert!(ep.log_option().is_unknown());
        assert!(ep.response_content_type.is_none());
        assert!(!ep.manual_status_code);
    }

    #[test]
    fn test_endpointer() {
        let eps = Module.endpoints();
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[1].permissions(), ["ping:delete"]);
    }

    #[test]
    fn test_factory_creates_fresh_controllers() {
        let ep = Endpoint::get("/ping", || Ping);
        let _a = (ep.controller)();
        let _b = (ep.controller)();
    }
}
