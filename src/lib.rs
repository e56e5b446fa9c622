//! # render-error-page
//!
//! Error page rendering for axum applications.
//!
//! Given an error raised while handling a request, the handler resolves an
//! HTTP status, builds a render context, renders a named error view and, if
//! that render fails, falls back to a small inline HTML page. Every error
//! event ends in exactly one response.
//!
//! ## Features
//!
//! - **Status resolution**: pluggable [`StatusClassifier`] with field fallback,
//!   always clamped to a valid status
//! - **Views**: any [`ViewRenderer`], with Handlebars templates built in
//! - **Fallback page**: a broken or missing view still yields a readable page
//! - **Logging hooks**: filter, serializer and logger, defaulting to `tracing`
//! - **Tower integration**: [`ExceptionLayer`] catches service errors and
//!   errors raised from handlers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_error_page::prelude::*;
//! use axum::{Router, body::Body, http::Request, routing::get};
//! use tower::{Layer, ServiceExt};
//!
//! async fn missing() -> std::result::Result<&'static str, HttpException> {
//!     Err(HttpException::from_status(StatusCode::NOT_FOUND))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let views = HandlebarsViews::new()
//!         .with_template("error", "<h1>{{error.statusCode}} {{error.statusMessage}}</h1>")
//!         .unwrap();
//!     let handler = render_error_page(ErrorPageOptions::new().with_include_error_stack(false));
//!
//!     let router = Router::new().route("/missing", get(missing));
//!     let app = ExceptionLayer::error_page(handler, views).layer(router);
//!
//!     let request = Request::get("/missing").body(Body::empty()).unwrap();
//!     let response = app.oneshot(request).await.unwrap();
//!     assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! }
//! ```

pub mod config;
pub mod error;
pub mod exception;
pub mod render;
pub mod status;
pub mod view;

// Re-export core types
pub use config::{ConfigService, ContextFields, ErrorPageConfig, ErrorPageOptions};
pub use error::{ErrorPageError, Result};
pub use exception::{
    ErrorDetails, ErrorPageFilter, ExceptionFilter, ExceptionLayer, HttpException, RaisedError,
    RequestInfo, SharedError,
};
pub use render::{ErrorResponse, RenderContext, RenderErrorPage, render_error_page};
pub use status::{DefaultStatusClassifier, StatusClassifier};
pub use view::{HandlebarsViews, ViewError, ViewRenderer};

/// Prelude module for convenient imports
///
/// ```
/// use render_error_page::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ConfigService, ContextFields, ErrorPageConfig, ErrorPageOptions};
    pub use crate::error::{ErrorPageError, Result};
    pub use crate::exception::{
        AxumErrorResponse, ErrorDetails, ErrorPageFilter, ExceptionFilter, ExceptionLayer,
        HttpException, RaisedError, RequestInfo, SharedError,
    };
    pub use crate::render::{ErrorResponse, RenderContext, RenderErrorPage, render_error_page};
    pub use crate::status::{DefaultStatusClassifier, StatusClassifier};
    pub use crate::view::{HandlebarsViews, ViewError, ViewRenderer};
    pub use async_trait::async_trait;
    pub use axum::http::StatusCode;
    pub use std::sync::Arc;
}
