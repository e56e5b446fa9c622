//! The error page handler.
//!
//! [`RenderErrorPage`] turns an error into exactly one response: the
//! rendered error view, an inline fallback page when the view fails, or a
//! hand-off to the continuation when headers already went out.

use crate::config::{ErrorPageConfig, ErrorPageOptions};
use crate::exception::{ErrorDetails, RequestInfo, SharedError};
use crate::status::resolve_status_code;
use crate::view::ViewError;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

pub mod context;
pub mod fallback;

pub use context::{ErrorContext, RenderContext};
pub use fallback::{RENDER_FAILURE_NOTICE, render_fallback_page};

/// The response an error page is written to
#[async_trait]
pub trait ErrorResponse: Send {
    /// Whether the transport already started sending this response
    fn headers_sent(&self) -> bool;

    fn set_status(&mut self, status: u16);

    fn send(&mut self, body: String);

    /// Render a view; the only point where the handler suspends
    async fn render(&self, view: &str, context: &RenderContext) -> Result<String, ViewError>;
}

/// Create an error page handler, merging `options` over the defaults
pub fn render_error_page(options: ErrorPageOptions) -> RenderErrorPage {
    RenderErrorPage::new(options)
}

/// Renders error pages
///
/// Cheap to clone; every clone shares the same read-only configuration.
#[derive(Debug, Clone)]
pub struct RenderErrorPage {
    config: Arc<ErrorPageConfig>,
}

impl RenderErrorPage {
    pub fn new(options: ErrorPageOptions) -> Self {
        Self::with_config(ErrorPageConfig::from(options))
    }

    pub fn with_config(config: ErrorPageConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ErrorPageConfig {
        &self.config
    }

    /// Handle one error event
    ///
    /// `next` is called, with the original error, only when the response
    /// headers were already sent. Render failures never escape: they end in
    /// the fallback page. Panics from the logging callbacks are not caught.
    pub async fn handle<R, N>(&self, error: SharedError, request: &RequestInfo, response: &mut R, next: N)
    where
        R: ErrorResponse + ?Sized,
        N: FnOnce(SharedError),
    {
        if response.headers_sent() {
            tracing::debug!(uri = %request.uri, "Headers already sent, delegating error");
            next(error);
            return;
        }

        self.log(error.as_ref(), request);

        let context = self.render_context(error.as_ref());
        response.set_status(context.status_code());

        match response.render(&self.config.error_view, &context).await {
            Ok(html) => response.send(html),
            Err(render_error) => {
                tracing::debug!(
                    view = %self.config.error_view,
                    "Error view failed to render: {}",
                    render_error
                );
                self.log(&render_error, request);
                let render_error = ErrorDetails::from_error(&render_error);
                response.send(render_fallback_page(&context, &render_error));
            }
        }
    }

    /// Resolve the status an error is served with
    pub fn resolve_status(&self, error: &(dyn Error + Send + Sync + 'static)) -> u16 {
        let details = ErrorDetails::from_error(error);
        self.resolve_status_with(error, &details)
    }

    /// Build the context the error view receives
    pub fn render_context(&self, error: &(dyn Error + Send + Sync + 'static)) -> RenderContext {
        let details = ErrorDetails::from_error(error);
        let status_code = self.resolve_status_with(error, &details);
        RenderContext::new(
            status_code,
            details,
            self.config.include_error_stack,
            self.config.context_fields,
        )
    }

    fn resolve_status_with(&self, error: &(dyn Error + Send + Sync + 'static), details: &ErrorDetails) -> u16 {
        resolve_status_code(
            error,
            details,
            Some(self.config.status_classifier.as_ref()),
            self.config.default_status_code,
        )
    }

    fn log(&self, error: &(dyn Error + Send + Sync + 'static), request: &RequestInfo) {
        if (self.config.error_logging_filter)(error) {
            let serialized = (self.config.error_logging_serializer)(error);
            (self.config.error_logger)(serialized, request);
        }
    }
}

impl Default for RenderErrorPage {
    fn default() -> Self {
        Self::with_config(ErrorPageConfig::default())
    }
}
