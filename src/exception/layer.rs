use crate::exception::{ExceptionFilter, RaisedError, RequestInfo, SharedError};
use crate::render::{ErrorResponse, RenderContext, RenderErrorPage};
use crate::view::{ViewError, ViewRenderer, render_with};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An [`ErrorResponse`] that ends up as an axum [`Response`]
///
/// Nothing is written to the wire until [`into_response`] is called, so
/// headers only count as sent once a body has been sent.
///
/// [`into_response`]: AxumErrorResponse::into_response
pub struct AxumErrorResponse {
    views: Arc<dyn ViewRenderer>,
    status: StatusCode,
    body: Option<String>,
}

impl AxumErrorResponse {
    pub fn new(views: Arc<dyn ViewRenderer>) -> Self {
        Self {
            views,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn into_response(self) -> Response {
        (self.status, Html(self.body.unwrap_or_default())).into_response()
    }
}

#[async_trait]
impl ErrorResponse for AxumErrorResponse {
    fn headers_sent(&self) -> bool {
        self.body.is_some()
    }

    fn set_status(&mut self, status: u16) {
        self.status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn send(&mut self, body: String) {
        self.body = Some(body);
    }

    async fn render(&self, view: &str, context: &RenderContext) -> Result<String, ViewError> {
        render_with(self.views.as_ref(), view, context).await
    }
}

/// Exception filter rendering error pages through a [`ViewRenderer`]
///
/// [`AxumErrorResponse`] never reports headers as sent before the handler
/// runs, so this filter always answers with a page. Delegation to the
/// continuation is only reachable through custom [`ErrorResponse`] surfaces.
#[derive(Clone)]
pub struct ErrorPageFilter {
    handler: RenderErrorPage,
    views: Arc<dyn ViewRenderer>,
}

impl ErrorPageFilter {
    pub fn new(handler: RenderErrorPage, views: impl ViewRenderer) -> Self {
        Self {
            handler,
            views: Arc::new(views),
        }
    }

    pub fn handler(&self) -> &RenderErrorPage {
        &self.handler
    }
}

#[async_trait]
impl ExceptionFilter for ErrorPageFilter {
    async fn catch(&self, error: SharedError, request: &RequestInfo) -> Result<Response, SharedError> {
        let mut response = AxumErrorResponse::new(Arc::clone(&self.views));
        let mut delegated = None;
        self.handler
            .handle(error, request, &mut response, |error| delegated = Some(error))
            .await;
        match delegated {
            Some(error) => Err(error),
            None => Ok(response.into_response()),
        }
    }
}

/// Tower Layer routing errors through an [`ExceptionFilter`]
///
/// Catches both `Err` results of the inner service and responses carrying
/// a [`RaisedError`] extension.
pub struct ExceptionLayer<F> {
    filter: Arc<F>,
}

impl<F: ExceptionFilter> ExceptionLayer<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl ExceptionLayer<ErrorPageFilter> {
    /// Layer rendering error pages with `handler` and `views`
    pub fn error_page(handler: RenderErrorPage, views: impl ViewRenderer) -> Self {
        Self::new(ErrorPageFilter::new(handler, views))
    }
}

impl<F> Clone for ExceptionLayer<F> {
    fn clone(&self) -> Self {
        Self {
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<S, F> Layer<S> for ExceptionLayer<F> {
    type Service = ExceptionMiddleware<S, F>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: Arc::clone(&self.filter),
        }
    }
}

pub struct ExceptionMiddleware<S, F> {
    inner: S,
    filter: Arc<F>,
}

impl<S: Clone, F> Clone for ExceptionMiddleware<S, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            filter: Arc::clone(&self.filter),
        }
    }
}

impl<S, F> Service<Request<Body>> for ExceptionMiddleware<S, F>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
    F: ExceptionFilter,
{
    type Response = Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let filter = Arc::clone(&self.filter);
        let info = RequestInfo::from_request(&request);
        // The clone may not be ready; swap so the ready one handles this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let error: SharedError = match inner.call(request).await {
                Ok(mut response) => match response.extensions_mut().remove::<RaisedError>() {
                    Some(RaisedError(error)) => error,
                    None => return Ok(response),
                },
                Err(error) => {
                    let error: BoxError = error.into();
                    Arc::from(error)
                }
            };

            filter
                .catch(error, &info)
                .await
                .map_err(|error| Box::new(error) as BoxError)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ErrorPageOptions;
    use crate::exception::HttpException;
    use crate::view::HandlebarsViews;
    use std::convert::Infallible;
    use tower::{ServiceExt, service_fn};

    fn views() -> HandlebarsViews {
        HandlebarsViews::new()
            .with_template("error", "{{error.statusCode}} {{error.message}}")
            .unwrap()
    }

    fn handler() -> RenderErrorPage {
        RenderErrorPage::new(
            ErrorPageOptions::new()
                .with_include_error_stack(true)
                .with_error_logging_filter(|_| false),
        )
    }

    #[tokio::test]
    async fn test_passes_through_successful_responses() {
        let inner = service_fn(|_: Request<Body>| async {
            Ok::<_, Infallible>((StatusCode::CREATED, "made").into_response())
        });
        let service = ExceptionLayer::error_page(handler(), views()).layer(inner);
        let response = service.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_renders_raised_errors() {
        let inner = service_fn(|_: Request<Body>| async {
            Ok::<_, Infallible>(HttpException::not_found("no such page").into_response())
        });
        let service = ExceptionLayer::error_page(handler(), views()).layer(inner);
        let response = service.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<RaisedError>().is_none());
    }

    #[tokio::test]
    async fn test_renders_service_errors() {
        let inner = service_fn(|_: Request<Body>| async {
            Err::<Response, _>(std::io::Error::from(std::io::ErrorKind::PermissionDenied))
        });
        let service = ExceptionLayer::error_page(handler(), views()).layer(inner);
        let response = service.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    struct Delegating;

    #[async_trait]
    impl ExceptionFilter for Delegating {
        async fn catch(&self, error: SharedError, _: &RequestInfo) -> Result<Response, SharedError> {
            Err(error)
        }
    }

    #[tokio::test]
    async fn test_delegated_errors_are_returned() {
        let inner = service_fn(|_: Request<Body>| async {
            Ok::<_, Infallible>(HttpException::internal("kaboom").into_response())
        });
        let service = ExceptionLayer::new(Delegating).layer(inner);
        let error = service
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "kaboom");
    }

    #[tokio::test]
    async fn test_error_page_filter_answers_with_a_page() {
        let filter = ErrorPageFilter::new(handler(), views());
        let error: SharedError = Arc::new(HttpException::not_found("gone"));
        let response = filter
            .catch(error, &RequestInfo::default())
            .await
            .expect("a fresh response never delegates");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_axum_response_counts_send_as_headers_sent() {
        let mut response = AxumErrorResponse::new(Arc::new(views()));
        assert!(!response.headers_sent());
        response.set_status(404);
        response.send("body".to_string());
        assert!(response.headers_sent());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), Some("body"));
    }
}
