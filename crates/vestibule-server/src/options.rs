//! Dispatcher options shared by every endpoint of a registry.

use std::fmt;
use std::sync::Arc;

use vestibule_config::DispatchSection;
use vestibule_core::{Alarmer, LogOption, MetricReporter};
use vestibule_mask::JsonMasker;

/// Registry-wide dispatch settings and the collaborators that observe every
/// request.
///
/// # Example
///
/// ```
/// use vestibule_core::LogOption;
/// use vestibule_server::DispatchOptions;
///
/// let options = DispatchOptions::new()
///     .with_url_prefix("/api/v1")
///     .with_default_log_option(LogOption::FULL_ON_EXIT)
///     .with_log_request_id(true);
///
/// assert_eq!(options.url_prefix(), "/api/v1");
/// ```
#[derive(Clone, Default)]
pub struct DispatchOptions {
    url_prefix: String,
    static_logging: bool,
    default_log_option: LogOption,
    verbose_errors: bool,
    log_request_id: bool,
    masker: Option<Arc<dyn JsonMasker>>,
    alarmer: Option<Arc<dyn Alarmer>>,
    metric_reporter: Option<Arc<dyn MetricReporter>>,
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("url_prefix", &self.url_prefix)
            .field("static_logging", &self.static_logging)
            .field("default_log_option", &self.default_log_option)
            .field("verbose_errors", &self.verbose_errors)
            .field("log_request_id", &self.log_request_id)
            .field("masker", &self.masker.is_some())
            .field("alarmer", &self.alarmer.is_some())
            .field("metric_reporter", &self.metric_reporter.is_some())
            .finish()
    }
}

impl DispatchOptions {
    /// Options with no prefix, dynamic logging and terse errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts the `[dispatch]` configuration section. Collaborators are
    /// not part of the configuration and must be added separately.
    #[must_use]
    pub fn from_config(section: &DispatchSection) -> Self {
        Self {
            url_prefix: section.url_prefix.clone(),
            static_logging: section.static_logging,
            default_log_option: section.default_log_option,
            verbose_errors: section.verbose_errors,
            log_request_id: section.log_request_id,
            ..Self::default()
        }
    }

    /// Prefix joined in front of every endpoint path.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// Reads each endpoint's log option once at build time. Handles returned
    /// by [`Routes::log_options`](crate::Routes::log_options) then have no
    /// effect.
    pub fn with_static_logging(mut self, enabled: bool) -> Self {
        self.static_logging = enabled;
        self
    }

    /// Log option of endpoints that declare none.
    pub fn with_default_log_option(mut self, lo: LogOption) -> Self {
        self.default_log_option = lo;
        self
    }

    /// Adds the wrapped error chain and error attributes to error bodies.
    pub fn with_verbose_errors(mut self, enabled: bool) -> Self {
        self.verbose_errors = enabled;
        self
    }

    /// Adds `reqId` to every request's log attributes.
    pub fn with_log_request_id(mut self, enabled: bool) -> Self {
        self.log_request_id = enabled;
        self
    }

    /// Masker applied to logged bodies.
    pub fn with_masker(mut self, masker: Arc<dyn JsonMasker>) -> Self {
        self.masker = Some(masker);
        self
    }

    /// Receives server-class failures.
    pub fn with_alarmer(mut self, alarmer: Arc<dyn Alarmer>) -> Self {
        self.alarmer = Some(alarmer);
        self
    }

    /// Receives one observation per request.
    pub fn with_metric_reporter(mut self, reporter: Arc<dyn MetricReporter>) -> Self {
        self.metric_reporter = Some(reporter);
        self
    }

    /// URL prefix.
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Whether log options are fixed at build time.
    pub fn static_logging(&self) -> bool {
        self.static_logging
    }

    /// Default log option.
    pub fn default_log_option(&self) -> LogOption {
        self.default_log_option
    }

    /// Whether error bodies are verbose.
    pub fn verbose_errors(&self) -> bool {
        self.verbose_errors
    }

    /// Whether `reqId` is logged.
    pub fn log_request_id(&self) -> bool {
        self.log_request_id
    }

    /// Bound masker.
    pub fn masker(&self) -> Option<&Arc<dyn JsonMasker>> {
        self.masker.as_ref()
    }

    /// Bound alarmer.
    pub fn alarmer(&self) -> Option<&Arc<dyn Alarmer>> {
        self.alarmer.as_ref()
    }

    /// Bound metric reporter.
    pub fn metric_reporter(&self) -> Option<&Arc<dyn MetricReporter>> {
        self.metric_reporter.as_ref()
    }
}

/// Joins `prefix` and `path` into a clean absolute path: no duplicate or
/// trailing slashes, `"/"` when both are empty.
pub(crate) fn join_path(prefix: &str, path: &str) -> String {
    let mut out = String::with_capacity(prefix.len() + path.len() + 1);
    for segment in prefix.split('/').chain(path.split('/')) {
        if segment.is_empty() {
            continue;
        }
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
