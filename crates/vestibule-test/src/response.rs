//! Test response wrapper.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A collected response with assertion helpers.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects an HTTP response.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self { status, headers, body }
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as a JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {}: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected.as_ref(), "header '{name}'");
        self
    }

    /// Asserts a top-level JSON field.
    ///
    /// # Panics
    ///
    /// Panics if the body is not a JSON object or the field differs.
    #[track_caller]
    pub fn assert_json_field(&self, field: &str, expected: &serde_json::Value) -> &Self {
        let value = self
            .json_value()
            .unwrap_or_else(|e| panic!("body is not JSON: {e}"));
        assert_eq!(value.get(field), Some(expected), "field '{field}' of {value}");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use serde_json::json;

    fn response() -> TestResponse {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        TestResponse::new(StatusCode::FORBIDDEN, headers, Bytes::from(r#"{"message":"forbidden"}"#))
    }

    #[test]
    fn test_accessors() {
        let response = response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text().unwrap(), r#"{"message":"forbidden"}"#);
        assert_eq!(response.json_value().unwrap()["message"], "forbidden");
    }

    #[test]
    fn test_assertions() {
        response()
            .assert_status(StatusCode::FORBIDDEN)
            .assert_header("content-type", "application/json")
            .assert_json_field("message", &json!("forbidden"));
    }

    #[test]
    #[should_panic(expected = "expected status 200 OK")]
    fn test_assert_status_fails() {
        response().assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_from_http() {
        let http = http::Response::builder()
            .status(StatusCode::CREATED)
            .body(Full::new(Bytes::from("done")))
            .unwrap();
        let response = TestResponse::from_http(http).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.text().unwrap(), "done");
    }
}
