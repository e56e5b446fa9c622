use async_trait::async_trait;
use axum::{
    http::{HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::error::Error;
use std::sync::Arc;

pub mod details;
pub mod http;
pub mod layer;

pub use details::ErrorDetails;
pub use http::HttpException;
pub use layer::{AxumErrorResponse, ErrorPageFilter, ExceptionLayer, ExceptionMiddleware};

/// An error as seen by the error page pipeline.
///
/// Shared rather than boxed so the same error can travel through response
/// extensions and still be handed to a continuation untouched.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Snapshot of the request that produced an error.
///
/// Taken before the request is handed to the inner service, since the
/// request itself is consumed by then.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Marker stored in response extensions by handlers that failed.
///
/// The [`ExceptionLayer`] looks for it on every response and, when found,
/// replaces the response with whatever its filter produces.
#[derive(Clone)]
pub struct RaisedError(pub SharedError);

impl RaisedError {
    pub fn new(error: impl Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(error))
    }

    pub fn error(&self) -> &SharedError {
        &self.0
    }
}

impl std::fmt::Debug for RaisedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RaisedError")
            .field(&self.0.to_string())
            .finish()
    }
}

impl IntoResponse for RaisedError {
    /// An empty 500 response carrying the error, for a layer to pick up
    fn into_response(self) -> Response {
        let mut response = Response::default();
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.extensions_mut().insert(self);
        response
    }
}

/// The ExceptionFilter trait
///
/// Filters turn errors raised during request processing into responses.
/// Returning `Err` hands the error back to the host untouched.
#[async_trait]
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    async fn catch(&self, error: SharedError, request: &RequestInfo) -> Result<Response, SharedError>;
}
