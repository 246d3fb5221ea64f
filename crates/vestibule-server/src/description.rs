//! Human-readable endpoint description served for `?description=true`.

use std::fmt::Write;

use crate::compiler::{CompiledEndpoint, InputSource};

/// Renders the description page of `ep`.
pub(crate) fn render(ep: &CompiledEndpoint) -> String {
    let mut page = String::from("<html><body>");
    let _ = write!(
        page,
        "Endpoint description: {} - {}<br>",
        ep.method,
        escape(&ep.path)
    );

    if !ep.perms.is_empty() {
        let _ = write!(page, "Permissions: {}<br>", escape(&ep.perms.join(", ")));
    }
    if ep.caps.params {
        let _ = write!(page, "Path parameters: {}<br>", ep.path_keys.join(", "));
    }
    match ep.input_source {
        InputSource::Query => {
            let _ = write!(page, "URL query input: {}<br>", ep.query_keys.join(", "));
        }
        InputSource::Body => page.push_str("Body input: JSON<br>"),
        InputSource::None => {}
    }
    for (path, directive) in ep.input_fields.directives() {
        let _ = write!(page, "Masked input field: {} ({})<br>", escape(&path), escape(&directive));
    }
    if ep.caps.result {
        let _ = write!(page, "Result: {}<br>", escape(ep.content_type.to_str().unwrap_or_default()));
    }
    for (path, directive) in ep.result_fields.directives() {
        let _ = write!(page, "Masked result field: {} ({})<br>", escape(&path), escape(&directive));
    }
    if let Some(label) = &ep.language_label {
        let _ = write!(page, "Label: {}<br>", escape(label));
    }

    page.push_str("</body></html>");
    page
}

pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};
    use vestibule_core::{DispatchResult, RequestContext};
    use vestibule_extract::{ExtractionError, ParamSchema, Params, QueryArgs};
    use vestibule_mask::{FieldKind, FieldMeta, JsonMask, MaskSchema};
    use vestibule_middleware::{BoxFuture, MiddlewareSet};

    use crate::compiler::{compile, AuthWiring, CompileEnv};
    use crate::controller::{Controller, Input, Output};
    use crate::endpoint::Endpoint;
    use crate::options::DispatchOptions;

    #[derive(Default)]
    struct OrderPath {
        id: u64,
    }

    impl ParamSchema for OrderPath {
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
    struct Order {
        card: String,
    }

    impl ParamSchema for Order {
        fn decode_path(&mut self, _params: &Params) -> Result<(), ExtractionError> {
            Ok(())
        }

        fn decode_query(&mut self, _args: &QueryArgs) -> Result<(), ExtractionError> {
            Ok(())
        }

        fn param_keys(&self, _keys: &mut Vec<&'static str>) {}
    }

    impl MaskSchema for Order {
        fn mask_kind(_tag: &str) -> FieldKind {
            FieldKind::Object([FieldMeta::new("card", "card", FieldKind::Scalar)].into_iter().collect())
        }
    }

    #[derive(Default)]
    struct UpdateOrder {
        path: OrderPath,
        body: Order,
    }

    impl Controller for UpdateOrder {
        fn handle<'a>(&'a mut self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn params(&mut self) -> Option<&mut dyn ParamSchema> {
            Some(&mut self.path)
        }

        fn input(&mut self) -> Option<&mut dyn Input> {
            Some(&mut self.body)
        }

        fn result(&self) -> Option<&dyn Output> {
            Some(&self.body)
        }
    }

    #[test]
    fn test_render_lists_facets() {
        let options = DispatchOptions::new()
            .with_url_prefix("/api")
            .with_masker(Arc::new(JsonMask::new()));
        let auth = AuthWiring::default();
        let env = CompileEnv::new(&auth, &options, Arc::new(MiddlewareSet::new()));
        let ep = compile(
            Endpoint::put("/orders/{id}", UpdateOrder::default).language_label("orders-v2"),
            &env,
        )
        .unwrap();

        let page = render(&ep);
        assert!(page.starts_with("<html><body>Endpoint description: PUT - /api/orders/{id}<br>"));
        assert!(page.contains("Path parameters: id<br>"));
        assert!(page.contains("Body input: JSON<br>"));
        assert!(page.contains("Masked input field: card (card)<br>"));
        assert!(page.contains("Result: application/json; charset=utf-8<br>"));
        assert!(page.contains("Label: orders-v2<br>"));
        assert!(page.ends_with("</body></html>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
        assert_eq!(escape("/orders/{id}"), "/orders/{id}");
    }
}
