//! Per-request pipeline of a compiled endpoint.
//!
//! Steps run strictly in order and stop at the first error:
//!
//! 1. base log attributes (`client`, `reqId`)
//! 2. before-authorization middleware
//! 3. authorization, when the endpoint is guarded
//! 4. `?description=true` short-circuit
//! 5. controller creation and input decoding
//! 6. after-authorization middleware
//! 7. `new request` line, controller, result, `completed` line, metric
//! 8. on-success middleware
//!
//! Any failure goes through [`CompiledEndpoint::fail`], which writes the JSON
//! error body, reports the metric and raises an alarm for 5xx statuses.

use http::header::{AUTHORIZATION, RETRY_AFTER};
use http::{HeaderValue, StatusCode};
use serde_json::{json, Map, Value};
use vestibule_core::{DispatchError, DispatchResult, LogOption, RequestContext, TokenPayload};
use vestibule_extract::{decode_path_params, QueryArgs};
use vestibule_middleware::{MiddlewareError, Phase};

use crate::compiler::{CompiledEndpoint, Guard, InputSource};
use crate::controller::Controller;
use crate::description;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Log option and error verbosity of one request. Authorization may raise
/// both.
#[derive(Debug, Clone, Copy)]
struct RequestState {
    lo: LogOption,
    verbose: bool,
}

enum Outcome {
    Completed,
    Described,
}

impl CompiledEndpoint {
    /// Runs the full pipeline. The response is left in `ctx`; errors never
    /// escape.
    pub(crate) async fn dispatch(&self, ctx: &mut RequestContext) {
        let mut state = RequestState {
            lo: self
                .static_log_option
                .unwrap_or_else(|| self.log_options.load()),
            verbose: self.options.verbose_errors(),
        };

        let client = client_ip(ctx);
        ctx.log("client", client);
        self.log_request_id(ctx);

        match self.run(ctx, &mut state).await {
            Ok(Outcome::Completed) => self.complete(ctx, state.lo).await,
            Ok(Outcome::Described) => {}
            Err(err) => self.fail(ctx, err, state.verbose).await,
        }
    }

    async fn run(&self, ctx: &mut RequestContext, state: &mut RequestState) -> DispatchResult<Outcome> {
        self.middlewares
            .run(Phase::BeforeAuthorization, ctx)
            .await
            .map_err(MiddlewareError::into_inner)?;
        // middleware may have adopted a forwarded id
        self.log_request_id(ctx);

        if let Some(guard) = &self.guard {
            self.authorize(guard, ctx, state)?;
        }
        if self.no_input_log {
            state.lo = state.lo.without(LogOption::REQ_BODY | LogOption::REQ_INPUT);
        }
        if self.no_result_log {
            state.lo = state.lo.without(LogOption::RESP_BODY | LogOption::RESP_OUTPUT);
        }

        if description_requested(ctx) {
            ctx.set_content_type(HeaderValue::from_static(HTML_CONTENT_TYPE));
            let page = description::render(self);
            ctx.body_writer().extend_from_slice(page.as_bytes());
            return Ok(Outcome::Described);
        }

        let mut controller = (self.controller)();
        self.init_controller(controller.as_mut(), ctx, state.lo)?;

        self.middlewares
            .run(Phase::AfterAuthorization, ctx)
            .await
            .map_err(MiddlewareError::into_inner)?;

        if state.lo.contains(LogOption::ENTER) && !state.lo.contains(LogOption::SILENT) {
            tracing::debug!(
                method = %self.method,
                path = %self.path,
                attrs = %attributes_json(ctx, false).0,
                "new request"
            );
        }

        controller.handle(ctx).await?;
        if !self.manual_status_code {
            ctx.set_status_code(self.success_status);
        }

        self.write_result(controller.as_ref(), ctx, state.lo)?;
        Ok(Outcome::Completed)
    }

    fn log_request_id(&self, ctx: &mut RequestContext) {
        if self.options.log_request_id() {
            let id = ctx.request_id();
            ctx.log("reqId", id.to_string());
        }
    }

    /// Authenticates the caller and checks the permission bitset.
    fn authorize(&self, guard: &Guard, ctx: &mut RequestContext, state: &mut RequestState) -> DispatchResult<()> {
        match self.perms.as_slice() {
            [one] => ctx.log("perm", one),
            many => ctx.log("perms", many),
        }

        let header = ctx
            .header(AUTHORIZATION.as_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(DispatchError::authorization_header_missed)?;

        if let Some(checker) = &guard.revoke_checker {
            let revoked = checker
                .is_token_revoked(&header)
                .map_err(|e| DispatchError::internal("revoked token check failed").with_source(e))?;
            if revoked {
                return Err(DispatchError::access_token_revoked());
            }
        }

        let raw = header.strip_prefix("Bearer ").unwrap_or(&header);
        let token = guard.token_decoder.decode(raw.as_bytes()).map_err(|e| {
            DispatchError::authentication("unauthorized")
                .with_attr("perms", self.perms.clone())
                .with_source(e)
        })?;
        let payload = token.application_payload();

        match guard.authorizer.is_allowed(payload.perms(), &self.perm_bits) {
            Ok(true) => {}
            Ok(false) => {
                return Err(with_identity(DispatchError::forbidden("forbidden"), payload.as_ref(), &self.perms));
            }
            Err(e) => {
                let err = DispatchError::authentication("unauthorized").with_source(e);
                return Err(with_identity(err, payload.as_ref(), &self.perms));
            }
        }

        if let Some(debugger) = &guard.request_debugger {
            let (log_in, log_out) = debugger.is_debug_required(payload.as_ref());
            if log_in {
                state.lo |= LogOption::REQ_BODY | LogOption::REQ_INPUT;
            }
            if log_out {
                state.lo |= LogOption::RESP_BODY;
            }
        }
        state.verbose |= payload.debug();
        ctx.set_token_payload(payload);
        Ok(())
    }

    /// Decodes path parameters and input into a fresh controller.
    fn init_controller(&self, controller: &mut dyn Controller, ctx: &mut RequestContext, lo: LogOption) -> DispatchResult<()> {
        if !ctx.params().is_empty() {
            let decoded = decode_path_params(ctx.params())?;
            ctx.set_params(decoded);
        }

        if self.caps.params {
            for key in &self.path_keys {
                if let Some(value) = ctx.params().get(key).map(str::to_string) {
                    ctx.log(*key, value);
                }
            }
            if let Some(params) = controller.params() {
                params.decode_path(ctx.params())?;
            }
        }

        match self.input_source {
            InputSource::None => {}
            InputSource::Query => {
                let args = QueryArgs::parse(ctx.query())?;
                for key in &self.query_keys {
                    if let Some(value) = args.get(key) {
                        ctx.log(*key, value);
                    }
                }
                if let Some(input) = controller.input() {
                    input.decode_query(&args)?;
                }
            }
            InputSource::Body => {
                if lo.contains(LogOption::REQ_BODY) {
                    self.log_request_body(ctx);
                }
                if let Some(input) = controller.input() {
                    input.decode_body(ctx.body())?;
                    if lo.contains(LogOption::REQ_INPUT) {
                        let value = input.log_value();
                        ctx.log("reqInput", value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Logs the request body, masked when a masker knows the input fields.
    fn log_request_body(&self, ctx: &mut RequestContext) {
        let body = ctx.body().clone();
        if body.is_empty() {
            return;
        }

        let masker = self.options.masker().filter(|_| !self.input_fields.is_empty());
        let Some(masker) = masker else {
            match serde_json::from_slice::<Value>(&body) {
                Ok(value) => ctx.log("requestBody", value),
                Err(e) => ctx.log("maskingFailedMessage", e.to_string()),
            }
            return;
        };

        let masked = masker
            .mask(&body, &self.input_fields)
            .map_err(|e| e.to_string())
            .and_then(|buf| serde_json::from_slice::<Value>(&buf).map_err(|e| e.to_string()));
        match masked {
            Ok(value) => ctx.log("maskedRequestBody", value),
            Err(message) => ctx.log("maskingFailedMessage", message),
        }
    }

    /// Serializes the result and writes it with the endpoint's content type.
    /// Logged copies are masked; the wire copy never is.
    fn write_result(&self, controller: &dyn Controller, ctx: &mut RequestContext, lo: LogOption) -> DispatchResult<()> {
        let Some(result) = controller.result() else {
            return Ok(());
        };

        let buf = match result.to_json() {
            Ok(buf) => buf,
            Err(e) => {
                ctx.log("result", result.log_value());
                return Err(DispatchError::internal("result serialization failed").with_source(e));
            }
        };

        if lo.contains(LogOption::RESP_OUTPUT) {
            ctx.log("result", result.log_value());
        }

        ctx.set_content_type(self.content_type.clone());

        if lo.contains(LogOption::RESP_BODY) {
            match self.options.masker() {
                Some(masker) if !self.result_fields.is_empty() => {
                    let masked = masker
                        .mask(&buf, &self.result_fields)
                        .map_err(|e| e.to_string())
                        .and_then(|b| serde_json::from_slice::<Value>(&b).map_err(|e| e.to_string()))
                        .unwrap_or_else(|message| json!({ "maskingError": message }));
                    ctx.log("maskedRespBody", masked);
                }
                _ => {
                    let raw = serde_json::from_slice::<Value>(&buf).unwrap_or(Value::Null);
                    ctx.log("respBody", raw);
                }
            }
        }

        ctx.body_writer().extend_from_slice(&buf);
        Ok(())
    }

    /// Exit line, metric and on-success middleware.
    async fn complete(&self, ctx: &mut RequestContext, lo: LogOption) {
        let dur = ctx.elapsed();

        if lo.contains(LogOption::EXIT) && !lo.contains(LogOption::SILENT) {
            let default = if lo.contains(LogOption::ENTER) {
                "completed"
            } else {
                "processed"
            };
            let (attrs, message) = attributes_json(ctx, true);
            let message = message.unwrap_or_else(|| default.to_string());
            tracing::debug!(
                method = %self.method,
                path = %self.path,
                attrs = %attrs,
                dur = ?dur,
                "{message}"
            );
        }

        self.report_metric(ctx.status_code(), dur.as_secs_f64(), ctx.response_body().len());

        if let Err(err) = self.middlewares.run(Phase::OnSuccessResponse, ctx).await {
            let status = err.source.status_code();
            tracing::error!(
                method = %self.method,
                path = %self.path,
                middleware = err.name,
                err = %err.source.server_json(),
                "on-success middleware failed"
            );
            if status.is_server_error() {
                self.alarm(ctx, &err.source);
            }
        }
    }

    /// Turns `err` into the error response.
    pub(crate) async fn fail(&self, ctx: &mut RequestContext, err: DispatchError, verbose: bool) {
        let status = err.status_code();
        ctx.set_status_code(status);
        ctx.body_writer().clear();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(value) = err.retry_after().and_then(|v| HeaderValue::from_str(v).ok()) {
                ctx.set_header(RETRY_AFTER, value);
            }
        }

        tracing::error!(
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            attrs = %attributes_json(ctx, false).0,
            err = %err.server_json(),
            "request failed"
        );

        ctx.set_content_type(HeaderValue::from_static(JSON_CONTENT_TYPE));
        match serde_json::to_vec(&err.to_body(verbose)) {
            Ok(body) => ctx.body_writer().extend_from_slice(&body),
            Err(e) => tracing::error!(error = %e, "error body serialization failed"),
        }

        self.report_metric(status, ctx.elapsed().as_secs_f64(), ctx.response_body().len());
        if status.is_server_error() {
            self.alarm(ctx, &err);
        }

        if let Err(mw) = self.middlewares.run(Phase::OnErrorResponse, ctx).await {
            tracing::error!(
                method = %self.method,
                path = %self.path,
                middleware = mw.name,
                err = %mw.source.server_json(),
                "on-error middleware failed"
            );
        }
    }

    fn report_metric(&self, status: StatusCode, duration_secs: f64, size: usize) {
        if let Some(reporter) = self.options.metric_reporter() {
            reporter.report_metric(self.method.as_str(), &self.path, status.as_u16(), duration_secs, size);
        }
    }

    fn alarm(&self, ctx: &RequestContext, err: &DispatchError) {
        let Some(alarmer) = self.options.alarmer() else {
            return;
        };
        let mut fields: Map<String, Value> = ctx
            .attributes()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        fields.insert("method".into(), Value::String(self.method.to_string()));
        fields.insert("path".into(), Value::String(self.path.clone()));
        fields.insert("status".into(), Value::from(err.status_code().as_u16()));
        fields.insert("err".into(), err.server_json());
        alarmer.alarm(&fields);
    }
}

fn with_identity(err: DispatchError, payload: &dyn TokenPayload, perms: &[String]) -> DispatchError {
    err.with_attr("user", payload.login())
        .with_attr("role", payload.role())
        .with_attr("perms", perms.to_vec())
}

fn description_requested(ctx: &RequestContext) -> bool {
    QueryArgs::parse(ctx.query()).is_ok_and(|args| args.get_bool("description"))
}

/// Collects the attribute bag into a JSON object. With `take_message` the
/// `message` entry is split off as the log line text.
fn attributes_json(ctx: &RequestContext, take_message: bool) -> (Value, Option<String>) {
    let mut message = None;
    let mut out = Map::with_capacity(ctx.attributes().len());
    for (key, value) in ctx.attributes() {
        if take_message && key == "message" {
            message = Some(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            continue;
        }
        out.insert(key.clone(), value.clone());
    }
    (Value::Object(out), message)
}

/// Client address: first `X-Forwarded-For` entry, then `X-Real-IP`, then the
/// peer address.
pub(crate) fn client_ip(ctx: &RequestContext) -> String {
    let forwarded = ctx
        .header("x-forwarded-for")
        .and_then(|v| v.split(',').map(str::trim).find(|s| !s.is_empty()));
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    if let Some(ip) = ctx.header("x-real-ip").map(str::trim).filter(|s| !s.is_empty()) {
        return ip.to_string();
    }
    ctx.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default()
}
