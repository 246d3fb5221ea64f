//! Test request building.

use std::net::SocketAddr;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use serde::Serialize;

use crate::error::TestError;

/// Builder for a request dispatched in memory.
///
/// Invalid headers or bodies are remembered and reported by
/// [`build`](Self::build) so builder chains stay infallible.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Starts a request.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: None,
            error: None,
        }
    }

    /// Sets a header, replacing earlier values.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| TestError::InvalidHeader(format!("{}: {e}", name.as_ref())));
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| TestError::InvalidHeader(format!("{}: {e}", value.as_ref())));
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) | (_, Err(e)) => self.fail(e),
        }
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(header::AUTHORIZATION.as_str(), format!("Bearer {}", token.as_ref()))
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and its content type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(e.into()),
        }
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Sets the peer address seen by the dispatcher.
    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    fn fail(&mut self, err: TestError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Builds the request and the peer address.
    pub fn build(self) -> Result<(Request<Bytes>, Option<SocketAddr>), TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI '{}': {e}", self.uri)))?;

        let mut request = Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok((request, self.remote_addr))
    }
}
