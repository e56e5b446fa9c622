use crate::exception::RaisedError;
use crate::status::clamp_status_code;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An error that knows which HTTP response it should become.
///
/// Carries both `status_code` and the older `status` field; the resolver
/// prefers `status_code` when both are present.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HttpException {
    status_code: Option<u16>,
    status: Option<u16>,
    message: String,
    code: Option<String>,
    name: Option<String>,
    #[source]
    source: Option<BoxError>,
    trace: Option<String>,
}

impl HttpException {
    /// Create an exception with a status code and message
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::plain(message)
        }
    }

    /// Create an exception without any status information
    ///
    /// The error page falls back to its configured default status for these.
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            status: None,
            message: message.into(),
            code: None,
            name: None,
            source: None,
            trace: capture_trace(),
        }
    }

    /// Create an exception from a status, using its reason phrase as message
    ///
    /// ```
    /// use render_error_page::exception::HttpException;
    /// use axum::http::StatusCode;
    ///
    /// let error = HttpException::from_status(StatusCode::NOT_FOUND);
    /// assert_eq!(error.to_string(), "Not Found");
    /// assert_eq!(error.name(), Some("NotFoundError"));
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Error");
        let name = format!("{}Error", reason.replace([' ', '-', '\''], ""));
        Self::new(status.as_u16(), reason).with_name(name)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST.as_u16(), message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND.as_u16(), message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), message)
    }

    /// Set the legacy `status` field, leaving `status_code` as is
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Backtrace captured at construction, if `RUST_BACKTRACE` allowed it
    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }
}

fn capture_trace() -> Option<String> {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        let status = self
            .status_code
            .or(self.status)
            .map(clamp_status_code)
            .and_then(|status| StatusCode::from_u16(status).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = RaisedError::new(self).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_reason_phrase() {
        let error = HttpException::from_status(StatusCode::IM_A_TEAPOT);
        assert_eq!(error.message(), "I'm a teapot");
        assert_eq!(error.name(), Some("ImateapotError"));
        assert_eq!(error.status_code(), Some(418));
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_plain_has_no_status() {
        let error = HttpException::plain("boom").with_code("E_BOOM");
        assert_eq!(error.status_code(), None);
        assert_eq!(error.code(), Some("E_BOOM"));
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn test_into_response_raises_error() {
        let response = HttpException::not_found("missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let raised = response
            .extensions()
            .get::<RaisedError>()
            .expect("error should be raised");
        assert_eq!(raised.error().to_string(), "missing");
    }

    #[test]
    fn test_source_is_exposed() {
        let io = std::io::Error::other("disk on fire");
        let error = HttpException::internal("save failed").with_source(io);
        let source = error.source().expect("source should be set");
        assert_eq!(source.to_string(), "disk on fire");
    }
}
