//! Endpoint compiler.
//!
//! Turns declarations into [`CompiledEndpoint`]s in one pass:
//!
//! 1. upper-case the method and join the path with the URL prefix
//! 2. bind the registry's collaborators and the default log option
//! 3. check the authorization wiring and resolve permission bit positions
//! 4. inspect one throwaway controller for its facets
//! 5. check that `{name}` placeholders and the path-parameter facet agree
//! 6. route input to the query string or the body by method
//! 7. precompute masking metadata when a masker is bound
//!
//! The first failure aborts the whole pass.

use std::sync::Arc;

use http::{HeaderValue, Method, StatusCode};
use vestibule_core::{
    Authorizer, LogOption, LogOptionHandle, PermissionManager, RequestDebugger, RevokeTokenChecker,
    TokenDecoder,
};
use vestibule_mask::{Fields, DEFAULT_TAG};
use vestibule_middleware::MiddlewareSet;
use vestibule_router::has_placeholder;

use crate::controller::{Capabilities, ControllerFactory};
use crate::endpoint::Endpoint;
use crate::error::CompileError;
use crate::options::{join_path, DispatchOptions};

/// Content type of controller results unless the endpoint sets one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Where controller input is decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The controller takes no input.
    None,
    /// URL query string (GET, DELETE).
    Query,
    /// JSON request body (POST, PUT, PATCH).
    Body,
}

/// Authorization collaborators bound by the registry.
#[derive(Clone, Default)]
pub(crate) struct AuthWiring {
    pub(crate) authorizer: Option<Arc<dyn Authorizer>>,
    pub(crate) token_decoder: Option<Arc<dyn TokenDecoder>>,
    pub(crate) permission_manager: Option<Arc<dyn PermissionManager>>,
    pub(crate) request_debugger: Option<Arc<dyn RequestDebugger>>,
    pub(crate) revoke_checker: Option<Arc<dyn RevokeTokenChecker>>,
    pub(crate) disabled: bool,
}

/// Resolved authorization of one endpoint.
#[derive(Clone)]
pub(crate) struct Guard {
    pub(crate) authorizer: Arc<dyn Authorizer>,
    pub(crate) token_decoder: Arc<dyn TokenDecoder>,
    pub(crate) revoke_checker: Option<Arc<dyn RevokeTokenChecker>>,
    pub(crate) request_debugger: Option<Arc<dyn RequestDebugger>>,
}

/// An endpoint ready to serve requests. Immutable apart from its shared
/// log option handle.
pub struct CompiledEndpoint {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) declared_path: String,
    pub(crate) perms: Vec<String>,
    pub(crate) perm_bits: Vec<u32>,
    pub(crate) guard: Option<Guard>,
    pub(crate) controller: ControllerFactory,
    pub(crate) caps: Capabilities,
    pub(crate) input_source: InputSource,
    pub(crate) path_keys: Vec<&'static str>,
    pub(crate) query_keys: Vec<&'static str>,
    pub(crate) input_fields: Fields,
    pub(crate) result_fields: Fields,
    pub(crate) content_type: HeaderValue,
    pub(crate) log_options: LogOptionHandle,
    pub(crate) static_log_option: Option<LogOption>,
    pub(crate) no_input_log: bool,
    pub(crate) no_result_log: bool,
    pub(crate) manual_status_code: bool,
    pub(crate) success_status: StatusCode,
    pub(crate) language_label: Option<String>,
    pub(crate) compress: bool,
    pub(crate) options: DispatchOptions,
    pub(crate) middlewares: Arc<MiddlewareSet>,
}

impl std::fmt::Debug for CompiledEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledEndpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("perm_bits", &self.perm_bits)
            .field("caps", &self.caps)
            .field("input_source", &self.input_source)
            .field("log_options", &self.log_options.load())
            .finish_non_exhaustive()
    }
}

impl CompiledEndpoint {
    /// Upper-case method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path including the URL prefix.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path as declared.
    pub fn declared_path(&self) -> &str {
        &self.declared_path
    }

    /// Required permission names.
    pub fn permissions(&self) -> &[String] {
        &self.perms
    }

    /// Resolved permission bit positions, in declaration order.
    pub fn permission_bits(&self) -> &[u32] {
        &self.perm_bits
    }

    /// Controller facets.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Input source derived from the method.
    pub fn input_source(&self) -> InputSource {
        self.input_source
    }

    /// Masking metadata of the input.
    pub fn input_fields(&self) -> &Fields {
        &self.input_fields
    }

    /// Masking metadata of the result.
    pub fn result_fields(&self) -> &Fields {
        &self.result_fields
    }

    /// Shared handle to the live log option.
    pub fn log_options(&self) -> &LogOptionHandle {
        &self.log_options
    }

    /// Whether responses are gzip-compressed for accepting clients.
    pub fn is_compressed(&self) -> bool {
        self.compress
    }
}

/// Inputs of one compile pass.
pub(crate) struct CompileEnv<'a> {
    pub(crate) auth: &'a AuthWiring,
    pub(crate) options: &'a DispatchOptions,
    pub(crate) middlewares: Arc<MiddlewareSet>,
}

impl<'a> CompileEnv<'a> {
    pub(crate) fn new(auth: &'a AuthWiring, options: &'a DispatchOptions, middlewares: Arc<MiddlewareSet>) -> Self {
        Self {
            auth,
            options,
            middlewares,
        }
    }
}

/// Upper-cases and sorts declarations by path, then method.
pub(crate) fn sort_endpoints(endpoints: &mut [Endpoint]) {
    for ep in endpoints.iter_mut() {
        ep.method = normalize_method(&ep.method);
    }
    endpoints.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then_with(|| a.method.as_str().cmp(b.method.as_str()))
    });
}

fn normalize_method(method: &Method) -> Method {
    let upper = method.as_str().to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).unwrap_or_else(|_| method.clone())
}

/// Compiles one declaration.
pub(crate) fn compile(ep: Endpoint, env: &CompileEnv<'_>) -> Result<CompiledEndpoint, CompileError> {
    let method = normalize_method(&ep.method);
    let declared_path = ep.path;
    let path = join_path(env.options.url_prefix(), &declared_path);

    let content_type = match &ep.response_content_type {
        Some(value) => HeaderValue::from_str(value).map_err(|_| CompileError::ContentType {
            method: method.clone(),
            path: declared_path.clone(),
            value: value.clone(),
        })?,
        None => HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
    };

    let (guard, perm_bits) = resolve_permissions(&method, &declared_path, &ep.perms, env.auth)?;

    let mut sample = (ep.controller)();
    let caps = Capabilities::inspect(sample.as_mut());

    let templated = has_placeholder(&path);
    if templated && !caps.params {
        return Err(CompileError::MissingPathParams {
            method,
            path: declared_path,
        });
    }
    if !templated && caps.params {
        return Err(CompileError::UnexpectedPathParams {
            method,
            path: declared_path,
        });
    }

    let input_source = match method {
        Method::GET | Method::DELETE if caps.input => InputSource::Query,
        Method::POST | Method::PUT | Method::PATCH if caps.input => InputSource::Body,
        Method::GET | Method::DELETE | Method::POST | Method::PUT | Method::PATCH => InputSource::None,
        _ => {
            return Err(CompileError::UnsupportedMethod {
                method,
                path: declared_path,
            })
        }
    };

    let mut path_keys = Vec::new();
    if let Some(params) = sample.params() {
        params.param_keys(&mut path_keys);
    }

    let mut query_keys = Vec::new();
    let mut input_fields = Fields::new();
    if let Some(input) = sample.input() {
        if input_source == InputSource::Query {
            query_keys = input.query_keys();
        }
        if let Some(masker) = env.options.masker() {
            input_fields = masker.fields(input.as_maskable(), DEFAULT_TAG);
        }
    }

    let mut result_fields = Fields::new();
    if let (Some(result), Some(masker)) = (sample.result(), env.options.masker()) {
        result_fields = masker.fields(result.as_maskable(), DEFAULT_TAG);
    }

    let log_option = ep.log_options.or(env.options.default_log_option());

    Ok(CompiledEndpoint {
        method,
        path,
        declared_path,
        perms: ep.perms,
        perm_bits,
        guard,
        controller: ep.controller,
        caps,
        input_source,
        path_keys,
        query_keys,
        input_fields,
        result_fields,
        content_type,
        log_options: LogOptionHandle::new(log_option),
        static_log_option: env.options.static_logging().then_some(log_option),
        no_input_log: ep.no_input_log,
        no_result_log: ep.no_result_log,
        manual_status_code: ep.manual_status_code,
        success_status: ep.success_status_code.unwrap_or(StatusCode::OK),
        language_label: ep.language_label,
        compress: ep.compress,
        options: env.options.clone(),
        middlewares: Arc::clone(&env.middlewares),
    })
}

/// Checks the authorization wiring of a permission-bearing endpoint and
/// resolves its bit positions. With authorization disabled the endpoint is
/// served unguarded; names are still resolved when a manager is bound.
fn resolve_permissions(
    method: &Method,
    path: &str,
    perms: &[String],
    auth: &AuthWiring,
) -> Result<(Option<Guard>, Vec<u32>), CompileError> {
    if perms.is_empty() {
        return Ok((None, Vec::new()));
    }

    if !auth.disabled {
        if auth.authorizer.is_none() {
            return Err(CompileError::MissingAuthorizer {
                method: method.clone(),
                path: path.to_string(),
            });
        }
        if auth.token_decoder.is_none() {
            return Err(CompileError::MissingTokenDecoder {
                method: method.clone(),
                path: path.to_string(),
            });
        }
        if auth.permission_manager.is_none() {
            return Err(CompileError::MissingPermissionManager {
                method: method.clone(),
                path: path.to_string(),
            });
        }
    }

    let mut bits = Vec::with_capacity(perms.len());
    if let Some(pm) = &auth.permission_manager {
        for name in perms {
            let pos = pm
                .permission_bit_pos(name)
                .ok_or_else(|| CompileError::UnknownPermission {
                    method: method.clone(),
                    path: path.to_string(),
                    permission: name.clone(),
                })?;
            bits.push(pos);
        }
    }

    if auth.disabled {
        return Ok((None, bits));
    }

    let guard = match (&auth.authorizer, &auth.token_decoder) {
        (Some(authorizer), Some(token_decoder)) => Some(Guard {
            authorizer: Arc::clone(authorizer),
            token_decoder: Arc::clone(token_decoder),
            revoke_checker: auth.revoke_checker.clone(),
            request_debugger: auth.request_debugger.clone(),
        }),
        _ => None,
    };
    Ok((guard, bits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Input, Output};
    use serde::{Deserialize, Serialize};
    use vestibule_core::{DispatchResult, RequestContext, Token};
    use vestibule_extract::{ExtractionError, ParamSchema, Params, QueryArgs};
    use vestibule_mask::{FieldKind, FieldMeta, JsonMask, MaskSchema};
    use vestibule_middleware::BoxFuture;

    #[derive(Default)]
    struct IdPath {
        id: i64,
    }

    impl ParamSchema for IdPath {
        fn decode_path(&mut self, params: &Params) -> Result<(), ExtractionError> {
            vestibule_extract::assign_path(&mut self.id, "id", params)
        }

        fn decode_query(&mut self, _args: &QueryArgs) -> Result<(), ExtractionError> {
            Ok(())
        }

        fn param_keys(&self, keys: &mut Vec<&'static str>) {
            keys.push("id");
        }
    }

    #[derive(Default, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl ParamSchema for Note {
        fn decode_path(&mut self, _params: &Params) -> Result<(), ExtractionError> {
            Ok(())
        }

        fn decode_query(&mut self, args: &QueryArgs) -> Result<(), ExtractionError> {
            vestibule_extract::assign_query(&mut self.text, "text", args)
        }

        fn param_keys(&self, keys: &mut Vec<&'static str>) {
            keys.push("text");
        }
    }

    impl MaskSchema for Note {
        fn mask_kind(_tag: &str) -> FieldKind {
            FieldKind::Object([FieldMeta::new("text", "-", FieldKind::Scalar)].into_iter().collect())
        }
    }

    #[derive(Default)]
    struct ByIdController {
        path: IdPath,
        note: Note,
    }

    impl Controller for ByIdController {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn params(&mut self) -> Option<&mut dyn ParamSchema> {
            Some(&mut self.path)
        }

        fn input(&mut self) -> Option<&mut dyn Input> {
            Some(&mut self.note)
        }

        fn result(&self) -> Option<&dyn Output> {
            Some(&self.note)
        }
    }

    #[derive(Default)]
    struct Plain;

    impl Controller for Plain {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct AllowAll;

    impl Authorizer for AllowAll {
        fn is_allowed(&self, _request: &[u8], _endpoint: &[u32]) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    struct NoDecoder;

    impl TokenDecoder for NoDecoder {
        fn decode(&self, _raw: &[u8]) -> anyhow::Result<Box<dyn Token>> {
            anyhow::bail!("not supported")
        }
    }

    struct Perms;

    impl PermissionManager for Perms {
        fn permission_bit_pos(&self, name: &str) -> Option<u32> {
            match name {
                "orders:read" => Some(3),
                "orders:write" => Some(4),
                _ => None,
            }
        }
    }

    fn env_parts(options: DispatchOptions) -> (AuthWiring, DispatchOptions) {
        (AuthWiring::default(), options)
    }

    fn full_auth() -> AuthWiring {
        AuthWiring {
            authorizer: Some(Arc::new(AllowAll)),
            token_decoder: Some(Arc::new(NoDecoder)),
            permission_manager: Some(Arc::new(Perms)),
            ..AuthWiring::default()
        }
    }

    fn compile_with(ep: Endpoint, auth: &AuthWiring, options: &DispatchOptions) -> Result<CompiledEndpoint, CompileError> {
        let env = CompileEnv::new(auth, options, Arc::new(MiddlewareSet::new()));
        compile(ep, &env)
    }

    #[test]
    fn test_sort_by_path_then_method() {
        let mut eps = vec![
            Endpoint::new(Method::from_bytes(b"post").unwrap(), "/b", || Plain),
            Endpoint::get("/b", || Plain),
            Endpoint::delete("/a", || Plain),
            Endpoint::get("/a", || Plain),
        ];
        sort_endpoints(&mut eps);
        let order: Vec<_> = eps.iter().map(|e| format!("{} {}", e.method, e.path)).collect();
        assert_eq!(order, ["DELETE /a", "GET /a", "GET /b", "POST /b"]);
    }

    #[test]
    fn test_missing_authorizer() {
        let (auth, options) = env_parts(DispatchOptions::new());
        let err = compile_with(Endpoint::get("/orders", || Plain).perm("orders:read"), &auth, &options)
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingAuthorizer { .. }));
        let msg = err.to_string();
        assert!(msg.contains("GET"));
        assert!(msg.contains("/orders"));
    }

    #[test]
    fn test_missing_decoder_and_manager() {
        let options = DispatchOptions::new();
        let mut auth = full_auth();
        auth.token_decoder = None;
        let err = compile_with(Endpoint::get("/orders", || Plain).perm("orders:read"), &auth, &options)
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingTokenDecoder { .. }));

        let mut auth = full_auth();
        auth.permission_manager = None;
        let err = compile_with(Endpoint::get("/orders", || Plain).perm("orders:read"), &auth, &options)
            .unwrap_err();
        assert!(matches!(err, CompileError::MissingPermissionManager { .. }));
    }

    #[test]
    fn test_unknown_permission() {
        let options = DispatchOptions::new().with_url_prefix("/api");
        let err = compile_with(
            Endpoint::get("/orders", || Plain).perms(["orders:read", "orders:purge"]),
            &full_auth(),
            &options,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "endpoint GET /orders mentioned unknown permission orders:purge"
        );
    }

    #[test]
    fn test_permission_bits_resolved() {
        let options = DispatchOptions::new();
        let compiled = compile_with(
            Endpoint::get("/orders", || Plain).perms(["orders:write", "orders:read"]),
            &full_auth(),
            &options,
        )
        .unwrap();
        assert_eq!(compiled.permission_bits(), [4, 3]);
        assert!(compiled.guard.is_some());
    }

    #[test]
    fn test_disabled_authorizer_skips_checks() {
        let auth = AuthWiring {
            disabled: true,
            ..AuthWiring::default()
        };
        let compiled = compile_with(
            Endpoint::get("/orders", || Plain).perm("orders:read"),
            &auth,
            &DispatchOptions::new(),
        )
        .unwrap();
        assert!(compiled.guard.is_none());
    }

    #[test]
    fn test_placeholder_contract() {
        let options = DispatchOptions::new();
        let auth = AuthWiring::default();

        let err = compile_with(Endpoint::get("/orders/{id}", || Plain), &auth, &options).unwrap_err();
        assert!(matches!(err, CompileError::MissingPathParams { .. }));
        assert!(err.to_string().contains("GET /orders/{id}"));

        let err = compile_with(Endpoint::get("/orders", ByIdController::default), &auth, &options)
            .unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedPathParams { .. }));
    }

    #[test]
    fn test_input_source_by_method() {
        let options = DispatchOptions::new();
        let auth = AuthWiring::default();

        let get = compile_with(Endpoint::get("/n/{id}", ByIdController::default), &auth, &options).unwrap();
        assert_eq!(get.input_source(), InputSource::Query);
        assert_eq!(get.query_keys, ["text"]);
        assert_eq!(get.path_keys, ["id"]);

        let put = compile_with(Endpoint::put("/n/{id}", ByIdController::default), &auth, &options).unwrap();
        assert_eq!(put.input_source(), InputSource::Body);
        assert!(put.query_keys.is_empty());

        let plain = compile_with(Endpoint::post("/n", || Plain), &auth, &options).unwrap();
        assert_eq!(plain.input_source(), InputSource::None);

        let err = compile_with(Endpoint::new(Method::OPTIONS, "/n", || Plain), &auth, &options).unwrap_err();
        assert_eq!(err.to_string(), "endpoint /n has unknown HTTP method OPTIONS");
    }

    #[test]
    fn test_prefix_defaults_and_content_type() {
        let options = DispatchOptions::new()
            .with_url_prefix("/api")
            .with_default_log_option(LogOption::FULL);
        let auth = AuthWiring::default();

        let compiled = compile_with(Endpoint::get("/ping", || Plain), &auth, &options).unwrap();
        assert_eq!(compiled.path(), "/api/ping");
        assert_eq!(compiled.declared_path(), "/ping");
        assert_eq!(compiled.log_options().load(), LogOption::FULL);
        assert_eq!(compiled.content_type, DEFAULT_CONTENT_TYPE);
        assert!(compiled.static_log_option.is_none());

        let compiled = compile_with(
            Endpoint::get("/ping", || Plain)
                .log_options(LogOption::EXIT)
                .response_content_type("text/plain"),
            &auth,
            &options.clone().with_static_logging(true),
        )
        .unwrap();
        assert_eq!(compiled.log_options().load(), LogOption::EXIT);
        assert_eq!(compiled.static_log_option, Some(LogOption::EXIT));
        assert_eq!(compiled.content_type, "text/plain");

        let err = compile_with(
            Endpoint::get("/ping", || Plain).response_content_type("bad\nvalue"),
            &auth,
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::ContentType { .. }));
    }

    #[test]
    fn test_mask_fields_precomputed_only_with_masker() {
        let auth = AuthWiring::default();

        let compiled = compile_with(
            Endpoint::post("/n/{id}", ByIdController::default),
            &auth,
            &DispatchOptions::new(),
        )
        .unwrap();
        assert!(compiled.input_fields().is_empty());
        assert!(compiled.result_fields().is_empty());

        let options = DispatchOptions::new().with_masker(Arc::new(JsonMask::new()));
        let compiled = compile_with(Endpoint::post("/n/{id}", ByIdController::default), &auth, &options).unwrap();
        assert_eq!(compiled.input_fields().len(), 1);
        assert_eq!(compiled.result_fields().get("text").unwrap().directive, "-");
    }
}
