//! Table of contents served at `GET /`.

use std::sync::{Arc, OnceLock};

use http::HeaderValue;
use vestibule_core::{DispatchResult, RequestContext};
use vestibule_middleware::BoxFuture;

use crate::controller::Controller;
use crate::description::escape;

/// Endpoint lines shared between the registry and the TOC controllers.
/// Filled once after every endpoint compiled.
pub(crate) type TocEntries = Arc<OnceLock<Vec<String>>>;

/// Lists every compiled endpoint as `METHOD PATH`, one per line.
pub(crate) struct TocController {
    entries: TocEntries,
}

impl TocController {
    pub(crate) fn new(entries: TocEntries) -> Self {
        Self { entries }
    }

    fn render(&self) -> String {
        let mut page = String::from("<html><body>");
        for line in self.entries.get().map(Vec::as_slice).unwrap_or_default() {
            page.push_str(&escape(line));
            page.push_str("<br>");
        }
        page.push_str("</body></html>");
        page
    }
}

impl Controller for TocController {
    fn handle<'a>(&'a mut self, ctx: &'a mut RequestContext) -> BoxFuture<'a, DispatchResult<()>> {
        Box::pin(async move {
            ctx.set_content_type(HeaderValue::from_static("text/html; charset=utf-8"));
            let page = self.render();
            ctx.body_writer().extend_from_slice(page.as_bytes());
            Ok(())
        })
    }
}
