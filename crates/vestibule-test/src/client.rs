//! In-memory client for a built route table.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use vestibule_server::Routes;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// Dispatches requests straight into [`Routes`] without binding a port.
///
/// Requests take the full path: middleware, authorization, decoding,
/// the controller, logging, metrics and alarms.
///
/// ```rust,ignore
/// let client = TestClient::new(vestibule.build()?);
///
/// let response = client
///     .post("/api/orders")
///     .bearer_token("alice")
///     .json(&json!({"sku": "A-1"}))
///     .send()
///     .await?;
/// response.assert_status(StatusCode::CREATED);
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    routes: Arc<Routes>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client owning `routes`.
    pub fn new(routes: Routes) -> Self {
        Self::from_arc(Arc::new(routes))
    }

    /// Creates a client sharing `routes`.
    pub fn from_arc(routes: Arc<Routes>) -> Self {
        Self {
            routes,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Route table under test.
    #[must_use]
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut builder = TestRequestBuilder::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest { client: self, builder }
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets the peer address.
    pub fn remote_addr(mut self, addr: std::net::SocketAddr) -> Self {
        self.builder = self.builder.remote_addr(addr);
        self
    }

    /// Dispatches the request.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let (request, remote_addr) = self.builder.build()?;
        let response = self.client.routes.handle(request, remote_addr).await;
        TestResponse::from_http(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use vestibule_core::{DispatchResult, RequestContext};
    use vestibule_server::{BoxFuture, Controller, Endpoint, Output, Vestibule};

    #[derive(Default)]
    struct Whoami {
        out: serde_json::Map<String, serde_json::Value>,
    }

    impl Controller for Whoami {
        fn handle<'a>(&'a mut self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async move {
                self.out.insert("client".into(), json!(ctx.header("x-client")));
                self.out.insert("method".into(), json!(ctx.method().as_str()));
                Ok(())
            })
        }

        fn result(&self) -> Option<&dyn Output> {
            Some(&self.out)
        }
    }

    fn client() -> TestClient {
        let mut vestibule = Vestibule::default();
        vestibule.add(vec![
            Endpoint::get("/whoami", Whoami::default),
            Endpoint::delete("/whoami", Whoami::default),
        ]);
        TestClient::new(vestibule.build().unwrap()).with_default_header("x-client", "suite")
    }

    #[tokio::test]
    async fn test_dispatches_in_memory() {
        let client = client();
        let response = client.get("/whoami").send().await.unwrap();
        response
            .assert_status(StatusCode::OK)
            .assert_json_field("client", &json!("suite"))
            .assert_json_field("method", &json!("GET"));

        let response = client.delete("/whoami").send().await.unwrap();
        response.assert_json_field("method", &json!("DELETE"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = client().post("/whoami").send().await.unwrap();
        response
            .assert_status(StatusCode::METHOD_NOT_ALLOWED)
            .assert_header("allow", "DELETE, GET");
    }
}
