//! # Vestibule Test
//!
//! In-memory testing for Vestibule route tables. Requests go straight into
//! [`Routes::handle`](vestibule_server::Routes::handle): no socket, no port,
//! but the full dispatch pipeline.
//!
//! - [`TestClient`] / [`TestResponse`] - request builder and response
//!   assertions
//! - [`fixtures`] - token decoder, alarmer and metric reporter doubles
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vestibule_test::fixtures::{FixedPayload, RecordingMetricReporter, StaticTokenDecoder};
//! use vestibule_test::TestClient;
//!
//! #[tokio::test]
//! async fn test_get_order() {
//!     let metrics = Arc::new(RecordingMetricReporter::new());
//!     let client = TestClient::new(app(Arc::clone(&metrics)));
//!
//!     let response = client.get("/api/orders/7").bearer_token("alice").send().await.unwrap();
//!
//!     response.assert_status(StatusCode::OK);
//!     assert_eq!(metrics.statuses(), vec![200]);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/vestibule-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod fixtures;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
