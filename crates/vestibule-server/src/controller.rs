//! Controller contract and its optional capability facets.
//!
//! A controller is created fresh for every request by the endpoint's
//! factory. Besides [`Controller::handle`] it may expose up to three facets:
//!
//! | Facet | Accessor | Filled from |
//! |-------|----------|-------------|
//! | path parameters | [`Controller::params`] | matched `{name}` segments |
//! | input | [`Controller::input`] | query string (GET, DELETE) or JSON body (POST, PUT, PATCH) |
//! | result | [`Controller::result`] | written as the response body |
//!
//! The compiler inspects one throwaway instance to resolve the facets into a
//! [`Capabilities`] descriptor, so the request path never has to guess.
//!
//! ```rust,ignore
//! #[derive(Default, Params)]
//! struct CustomerPath {
//!     #[param("id")]
//!     id: i64,
//! }
//!
//! #[derive(Default)]
//! struct GetCustomer {
//!     path: CustomerPath,
//!     out: Customer,
//! }
//!
//! impl Controller for GetCustomer {
//!     fn handle<'a>(&'a mut self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
//!         Box::pin(async move {
//!             self.out = load_customer(self.path.id).await?;
//!             ctx.log("customerId", self.path.id);
//!             Ok(())
//!         })
//!     }
//!
//!     fn params(&mut self) -> Option<&mut dyn ParamSchema> {
//!         Some(&mut self.path)
//!     }
//!
//!     fn result(&self) -> Option<&dyn Output> {
//!         Some(&self.out)
//!     }
//! }
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use vestibule_core::{DispatchResult, RequestContext};
use vestibule_extract::{decode_body_into, ExtractionError, ParamSchema, QueryArgs};
use vestibule_mask::{MaskSchema, Maskable};
use vestibule_middleware::BoxFuture;

/// Business logic behind one endpoint.
pub trait Controller: Send {
    /// Runs the business logic. Facets are already decoded when this is
    /// called.
    fn handle<'a>(&'a mut self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>>;

    /// Destination of path parameters.
    fn params(&mut self) -> Option<&mut dyn ParamSchema> {
        None
    }

    /// Destination of the query string or the request body.
    fn input(&mut self) -> Option<&mut dyn Input> {
        None
    }

    /// Value written as the response body.
    fn result(&self) -> Option<&dyn Output> {
        None
    }
}

/// Creates one controller per request.
pub type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Request input a controller can be filled with.
///
/// Implemented for every type that derives `Params`, `Masked`,
/// `Deserialize` and `Serialize`.
pub trait Input: Send {
    /// Fills the tagged fields from the query string.
    fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError>;

    /// Merges the decoded JSON body over the current value. Fields the body
    /// does not mention keep what the path or the factory put there.
    fn decode_body(&mut self, body: &[u8]) -> Result<(), ExtractionError>;

    /// Query keys the type reads, in declaration order.
    fn query_keys(&self) -> Vec<&'static str>;

    /// JSON rendering for the request log.
    fn log_value(&self) -> Value;

    /// Masking metadata access.
    fn as_maskable(&self) -> &dyn Maskable;
}

impl<T> Input for T
where
    T: ParamSchema + DeserializeOwned + Serialize + MaskSchema + Send,
{
    fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError> {
        ParamSchema::decode_query(self, args)
    }

    fn decode_body(&mut self, body: &[u8]) -> Result<(), ExtractionError> {
        decode_body_into(body, self)
    }

    fn query_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        self.param_keys(&mut keys);
        keys
    }

    fn log_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn as_maskable(&self) -> &dyn Maskable {
        self
    }
}

/// Controller result written to the response.
pub trait Output {
    /// Serializes the value as compact JSON.
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;

    /// JSON rendering for the request log.
    fn log_value(&self) -> Value;

    /// Masking metadata access.
    fn as_maskable(&self) -> &dyn Maskable;
}

impl<T> Output for T
where
    T: Serialize + MaskSchema,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    fn log_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    fn as_maskable(&self) -> &dyn Maskable {
        self
    }
}

/// Facets a controller exposes, resolved once at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Accepts path parameters.
    pub params: bool,
    /// Accepts query or body input.
    pub input: bool,
    /// Produces a result.
    pub result: bool,
}

impl Capabilities {
    /// Probes `controller`.
    pub fn inspect(controller: &mut dyn Controller) -> Self {
        Self {
            params: controller.params().is_some(),
            input: controller.input().is_some(),
            result: controller.result().is_some(),
        }
    }
}
