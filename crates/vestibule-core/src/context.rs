//! Request context types.
//!
//! The [`RequestContext`] carries all per-request state through the dispatch
//! pipeline: the request itself, the attribute bag that ends up in the final
//! log line, the authenticated token payload and the response under
//! construction.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use vestibule_router::Params;

use crate::token::TokenPayload;
use crate::Attributes;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines of one process sortable by
/// request start.
///
/// # Example
///
/// ```
/// use vestibule_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID, e.g. one forwarded in `X-Request-Id`.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Response under construction.
#[derive(Debug, Clone)]
pub struct ResponseState {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }
}

/// Per-request state shared by the dispatcher, middleware and controllers.
///
/// # Example
///
/// ```
/// use http::Method;
/// use vestibule_core::RequestContext;
///
/// let mut ctx = RequestContext::new(Method::GET, "/customers/7".parse().unwrap());
/// ctx.log("customerId", 7);
/// assert_eq!(ctx.attributes()["customerId"], 7);
/// ```
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    remote_addr: Option<SocketAddr>,
    params: Params,
    body: Bytes,
    attributes: Attributes,
    token: Option<Arc<dyn TokenPayload>>,
    response: ResponseState,
    started: Instant,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("params", &self.params)
            .field("authenticated", &self.token.is_some())
            .field("status", &self.response.status)
            .finish_non_exhaustive()
    }
}

impl RequestContext {
    /// Creates a context for a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            uri,
            headers: HeaderMap::new(),
            remote_addr: None,
            params: Params::new(),
            body: Bytes::new(),
            attributes: Attributes::new(),
            token: None,
            response: ResponseState::default(),
            started: Instant::now(),
        }
    }

    /// Sets the request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the peer address.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    /// Request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Replaces the request ID, e.g. with one forwarded by a trusted proxy.
    pub fn set_request_id(&mut self, id: RequestId) {
        self.request_id = id;
    }

    /// Request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, empty when absent.
    #[must_use]
    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of a request header, `None` if absent or not visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Peer address, if known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Path parameters captured by the router.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replaces the path parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Adds an attribute to the request log line. Later values for the same
    /// key replace earlier ones; a `"message"` key overrides the text of the
    /// final log line.
    pub fn log(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or_else(|e| Value::String(e.to_string()));
        self.attributes.insert(key.into(), value);
    }

    /// Adds several attributes at once.
    pub fn log_values<K, V, I>(&mut self, values: I)
    where
        K: Into<String>,
        V: Serialize,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in values {
            self.log(k, v);
        }
    }

    /// Attribute bag collected so far.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Mutable access to the attribute bag.
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Authenticated token payload, `None` before authorization and on
    /// public endpoints.
    #[must_use]
    pub fn token_payload(&self) -> Option<&Arc<dyn TokenPayload>> {
        self.token.as_ref()
    }

    /// Stores the authenticated token payload.
    pub fn set_token_payload(&mut self, payload: Arc<dyn TokenPayload>) {
        self.token = Some(payload);
    }

    /// Response status set so far.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.response.status
    }

    /// Sets the response status.
    pub fn set_status_code(&mut self, status: StatusCode) {
        self.response.status = status;
    }

    /// Sets the response `Content-Type`.
    pub fn set_content_type(&mut self, value: HeaderValue) {
        self.response.headers.insert(CONTENT_TYPE, value);
    }

    /// Sets a response header, replacing previous values.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response.headers.insert(name, value);
    }

    /// Response headers set so far.
    #[must_use]
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response.headers
    }

    /// Response body buffer for direct writes.
    pub fn body_writer(&mut self) -> &mut Vec<u8> {
        &mut self.response.body
    }

    /// Response body written so far.
    #[must_use]
    pub fn response_body(&self) -> &[u8] {
        &self.response.body
    }

    /// Clears status, headers and body, keeping request data and attributes.
    pub fn reset_response(&mut self) {
        self.response = ResponseState::default();
    }

    /// Moves the response out, leaving a default one behind.
    pub fn take_response(&mut self) -> ResponseState {
        std::mem::take(&mut self.response)
    }

    /// When dispatch of this request began.
    #[must_use]
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Time since dispatch began.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_time_ordered() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert!(a.as_uuid() <= b.as_uuid());
    }

    #[test]
    fn test_log_replaces_and_keeps_order() {
        let mut ctx = RequestContext::new(Method::GET, Uri::from_static("/"));
        ctx.log("b", 1);
        ctx.log("a", "x");
        ctx.log("b", 2);
        let keys: Vec<_> = ctx.attributes().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(ctx.attributes()["b"], 2);
    }

    #[test]
    fn test_query_and_header_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        let ctx = RequestContext::new(Method::GET, Uri::from_static("/a?id=1"))
            .with_headers(headers);
        assert_eq!(ctx.path(), "/a");
        assert_eq!(ctx.query(), "id=1");
        assert_eq!(ctx.header("Authorization"), Some("Bearer abc"));
        assert_eq!(ctx.header("x-missing"), None);
    }

    #[test]
    fn test_reset_and_take_response() {
        let mut ctx = RequestContext::new(Method::POST, Uri::from_static("/a"));
        ctx.set_status_code(StatusCode::CREATED);
        ctx.set_content_type(HeaderValue::from_static("text/plain"));
        ctx.body_writer().extend_from_slice(b"done");

        let taken = ctx.take_response();
        assert_eq!(taken.status, StatusCode::CREATED);
        assert_eq!(taken.body, b"done");
        assert_eq!(ctx.status_code(), StatusCode::OK);

        ctx.body_writer().push(b'x');
        ctx.reset_response();
        assert!(ctx.response_body().is_empty());
    }
}
