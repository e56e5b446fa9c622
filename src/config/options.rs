//! Error page options and the merged configuration built from them.

use crate::config::{APP_ENV, ConfigService};
use crate::error::Result;
use crate::exception::{ErrorDetails, RequestInfo};
use crate::status::{DefaultStatusClassifier, StatusClassifier};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

pub const ERROR_PAGE_VIEW: &str = "ERROR_PAGE_VIEW";
pub const ERROR_PAGE_INCLUDE_STACK: &str = "ERROR_PAGE_INCLUDE_STACK";
pub const ERROR_PAGE_DEFAULT_STATUS: &str = "ERROR_PAGE_DEFAULT_STATUS";
pub const ERROR_PAGE_CONTEXT_FIELDS: &str = "ERROR_PAGE_CONTEXT_FIELDS";

/// Receives the serialized error together with the request it came from
pub type ErrorLogger = Arc<dyn Fn(serde_json::Value, &RequestInfo) + Send + Sync>;

/// Decides whether an error gets logged at all
pub type ErrorLoggingFilter = Arc<dyn Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync>;

/// Turns an error into the value handed to the logger
pub type ErrorLoggingSerializer =
    Arc<dyn Fn(&(dyn Error + Send + Sync + 'static)) -> serde_json::Value + Send + Sync>;

/// Which fields the view receives under `error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContextFields {
    /// `statusCode`, `message` and `stack`
    Minimal,
    /// Minimal plus `status`, `code`, `name` and `statusMessage`
    #[default]
    Extended,
}

/// User overrides for the error page
///
/// Every field is optional; unset fields keep the value from
/// [`ErrorPageConfig::default`].
#[derive(Clone, Default)]
pub struct ErrorPageOptions {
    pub error_view: Option<String>,
    pub include_error_stack: Option<bool>,
    pub default_status_code: Option<u16>,
    pub context_fields: Option<ContextFields>,
    pub error_logger: Option<ErrorLogger>,
    pub error_logging_filter: Option<ErrorLoggingFilter>,
    pub error_logging_serializer: Option<ErrorLoggingSerializer>,
    pub status_classifier: Option<Arc<dyn StatusClassifier>>,
}

impl ErrorPageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from a [`ConfigService`]
    ///
    /// When `ERROR_PAGE_INCLUDE_STACK` is unset the stack is included unless
    /// the service reports a production environment.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let include_error_stack = match config.get_bool(ERROR_PAGE_INCLUDE_STACK)? {
            Some(include) => include,
            None => !config.is_production(),
        };
        Ok(Self {
            error_view: config.get(ERROR_PAGE_VIEW),
            include_error_stack: Some(include_error_stack),
            default_status_code: config.get_parsed(ERROR_PAGE_DEFAULT_STATUS)?,
            context_fields: config.get_parsed(ERROR_PAGE_CONTEXT_FIELDS)?,
            ..Self::default()
        })
    }

    pub fn with_error_view(mut self, view: impl Into<String>) -> Self {
        self.error_view = Some(view.into());
        self
    }

    pub fn with_include_error_stack(mut self, include: bool) -> Self {
        self.include_error_stack = Some(include);
        self
    }

    pub fn with_default_status_code(mut self, status: u16) -> Self {
        self.default_status_code = Some(status);
        self
    }

    pub fn with_context_fields(mut self, fields: ContextFields) -> Self {
        self.context_fields = Some(fields);
        self
    }

    pub fn with_error_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(serde_json::Value, &RequestInfo) + Send + Sync + 'static,
    {
        self.error_logger = Some(Arc::new(logger));
        self
    }

    pub fn with_error_logging_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&(dyn Error + Send + Sync + 'static)) -> bool + Send + Sync + 'static,
    {
        self.error_logging_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_error_logging_serializer<F>(mut self, serializer: F) -> Self
    where
        F: Fn(&(dyn Error + Send + Sync + 'static)) -> serde_json::Value + Send + Sync + 'static,
    {
        self.error_logging_serializer = Some(Arc::new(serializer));
        self
    }

    pub fn with_status_classifier(mut self, classifier: impl StatusClassifier) -> Self {
        self.status_classifier = Some(Arc::new(classifier));
        self
    }

    /// Merge these overrides over `defaults`
    pub fn merge(self, defaults: ErrorPageConfig) -> ErrorPageConfig {
        ErrorPageConfig {
            error_view: self.error_view.unwrap_or(defaults.error_view),
            include_error_stack: self
                .include_error_stack
                .unwrap_or(defaults.include_error_stack),
            default_status_code: self
                .default_status_code
                .unwrap_or(defaults.default_status_code),
            context_fields: self.context_fields.unwrap_or(defaults.context_fields),
            error_logger: self.error_logger.unwrap_or(defaults.error_logger),
            error_logging_filter: self
                .error_logging_filter
                .unwrap_or(defaults.error_logging_filter),
            error_logging_serializer: self
                .error_logging_serializer
                .unwrap_or(defaults.error_logging_serializer),
            status_classifier: self.status_classifier.unwrap_or(defaults.status_classifier),
        }
    }
}

impl fmt::Debug for ErrorPageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorPageOptions")
            .field("error_view", &self.error_view)
            .field("include_error_stack", &self.include_error_stack)
            .field("default_status_code", &self.default_status_code)
            .field("context_fields", &self.context_fields)
            .field("error_logger", &self.error_logger.is_some())
            .field("error_logging_filter", &self.error_logging_filter.is_some())
            .field("error_logging_serializer", &self.error_logging_serializer.is_some())
            .field("status_classifier", &self.status_classifier.is_some())
            .finish()
    }
}

/// Fully resolved error page configuration
///
/// Built once when the handler is created and only read afterwards.
#[derive(Clone)]
pub struct ErrorPageConfig {
    pub error_view: String,
    pub include_error_stack: bool,
    pub default_status_code: u16,
    pub context_fields: ContextFields,
    pub error_logger: ErrorLogger,
    pub error_logging_filter: ErrorLoggingFilter,
    pub error_logging_serializer: ErrorLoggingSerializer,
    pub status_classifier: Arc<dyn StatusClassifier>,
}

impl Default for ErrorPageConfig {
    /// The default options
    ///
    /// Stacks are included unless `APP_ENV` is "production" in the
    /// environment at the time this is called.
    fn default() -> Self {
        Self {
            error_view: "error".to_string(),
            include_error_stack: !ConfigService::from_env_keys([APP_ENV]).is_production(),
            default_status_code: 500,
            context_fields: ContextFields::default(),
            error_logger: Arc::new(log_error),
            error_logging_filter: Arc::new(|_: &(dyn Error + Send + Sync + 'static)| true),
            error_logging_serializer: Arc::new(|error: &(dyn Error + Send + Sync + 'static)| {
                ErrorDetails::from_error(error).to_json()
            }),
            status_classifier: Arc::new(DefaultStatusClassifier),
        }
    }
}

impl From<ErrorPageOptions> for ErrorPageConfig {
    fn from(options: ErrorPageOptions) -> Self {
        options.merge(Self::default())
    }
}

impl fmt::Debug for ErrorPageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorPageConfig")
            .field("error_view", &self.error_view)
            .field("include_error_stack", &self.include_error_stack)
            .field("default_status_code", &self.default_status_code)
            .field("context_fields", &self.context_fields)
            .finish_non_exhaustive()
    }
}

fn log_error(error: serde_json::Value, request: &RequestInfo) {
    tracing::error!(
        method = %request.method,
        uri = %request.uri,
        error = %error,
        "Request failed"
    );
}
