//! Server and compile errors.

use http::Method;
use thiserror::Error;
use vestibule_router::RouteError;

/// Reason the endpoint table could not be compiled.
///
/// Compile errors are raised before any traffic is served. `path` is always
/// the path as declared, without the URL prefix.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A permission-bearing endpoint has no authorizer.
    #[error("endpoint {method} {path} requires calling set_authorizer() before")]
    MissingAuthorizer {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// A permission-bearing endpoint has no token decoder.
    #[error("endpoint {method} {path} requires calling set_token_decoder() before")]
    MissingTokenDecoder {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// A permission-bearing endpoint has no permission manager.
    #[error("endpoint {method} {path} requires calling set_permission_manager() before")]
    MissingPermissionManager {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// The permission manager does not know a declared permission.
    #[error("endpoint {method} {path} mentioned unknown permission {permission}")]
    UnknownPermission {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
        /// The unknown name.
        permission: String,
    },

    /// The path has a `{name}` placeholder but the controller takes no
    /// path parameters.
    #[error("endpoint {method} {path} path has parameters, but controller does not accept path parameters")]
    MissingPathParams {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// The controller takes path parameters but the path has none.
    #[error("endpoint {method} {path} path has no parameters, but controller accepts path parameters")]
    UnexpectedPathParams {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// Only GET, DELETE, POST, PUT and PATCH can be dispatched.
    #[error("endpoint {path} has unknown HTTP method {method}")]
    UnsupportedMethod {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
    },

    /// The response content type is not a valid header value.
    #[error("endpoint {method} {path} has invalid response content type {value:?}")]
    ContentType {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
        /// Rejected value.
        value: String,
    },

    /// The router rejected the route.
    #[error("endpoint {method} {path} cannot be registered: {source}")]
    Route {
        /// Endpoint method.
        method: Method,
        /// Declared path.
        path: String,
        /// Router error.
        #[source]
        source: RouteError,
    },
}

impl CompileError {
    /// Method of the offending endpoint.
    #[must_use]
    pub fn method(&self) -> &Method {
        match self {
            Self::MissingAuthorizer { method, .. }
            | Self::MissingTokenDecoder { method, .. }
            | Self::MissingPermissionManager { method, .. }
            | Self::UnknownPermission { method, .. }
            | Self::MissingPathParams { method, .. }
            | Self::UnexpectedPathParams { method, .. }
            | Self::UnsupportedMethod { method, .. }
            | Self::ContentType { method, .. }
            | Self::Route { method, .. } => method,
        }
    }

    /// Declared path of the offending endpoint.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::MissingAuthorizer { path, .. }
            | Self::MissingTokenDecoder { path, .. }
            | Self::MissingPermissionManager { path, .. }
            | Self::UnknownPermission { path, .. }
            | Self::MissingPathParams { path, .. }
            | Self::UnexpectedPathParams { path, .. }
            | Self::UnsupportedMethod { path, .. }
            | Self::ContentType { path, .. }
            | Self::Route { path, .. } => path,
        }
    }
}

/// Errors from the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_names_endpoint() {
        let err = CompileError::MissingAuthorizer {
            method: Method::GET,
            path: "/orders".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "endpoint GET /orders requires calling set_authorizer() before"
        );
        assert_eq!(*err.method(), Method::GET);
        assert_eq!(err.path(), "/orders");
    }

    #[test]
    fn test_unknown_method_message() {
        let err = CompileError::UnsupportedMethod {
            method: Method::OPTIONS,
            path: "/orders".to_string(),
        };
        assert_eq!(err.to_string(), "endpoint /orders has unknown HTTP method OPTIONS");
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Bind("address in use".to_string());
        assert_eq!(err.to_string(), "bind error: address in use");
    }
}
