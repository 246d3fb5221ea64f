//! Request ID propagation.
//!
//! Echoes the request ID in the `X-Request-ID` response header so clients
//! can quote it when reporting problems. Register it at
//! [`Phase::BeforeAuthorization`](crate::Phase::BeforeAuthorization) so the
//! header is present on error responses too.

use http::header::HeaderName;
use http::HeaderValue;
use uuid::Uuid;
use vestibule_core::{DispatchError, RequestContext, RequestId};

use crate::middleware::{BoxFuture, Middleware};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that adopts or announces request IDs.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to adopt a UUID sent in the `X-Request-ID` request header.
    ///
    /// Only enable this behind a proxy that sets the header itself.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates the middleware. Incoming IDs are ignored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that adopts incoming `X-Request-ID` values.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Result<(), DispatchError>> {
        Box::pin(async move {
            if self.trust_incoming {
                if let Some(id) = ctx
                    .header(REQUEST_ID_HEADER)
                    .and_then(|raw| Uuid::parse_str(raw).ok())
                {
                    ctx.set_request_id(RequestId::from_uuid(id));
                }
            }

            let value = HeaderValue::from_str(&ctx.request_id().to_string())
                .map_err(|e| DispatchError::internal("request id is not a header value").with_source(e))?;
            ctx.set_header(HeaderName::from_static(REQUEST_ID_HEADER), value);
            Ok(())
        })
    }
}
