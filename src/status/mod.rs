//! HTTP status resolution for arbitrary errors.

use crate::exception::{ErrorDetails, HttpException};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use std::error::Error;
use std::io::ErrorKind;

/// Status used whenever a resolved value falls outside the valid range
pub const FALLBACK_STATUS_CODE: u16 = 500;

/// Maps known error shapes to a conventional HTTP status.
///
/// Returning `None` means "not recognised"; the resolver then reads the
/// error's own status fields.
pub trait StatusClassifier: Send + Sync + 'static {
    fn classify(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<u16>;
}

impl<F> StatusClassifier for F
where
    F: Fn(&(dyn Error + Send + Sync + 'static)) -> Option<u16> + Send + Sync + 'static,
{
    fn classify(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<u16> {
        self(error)
    }
}

/// Classifier for this crate's, std, serde_json and axum extractor errors
///
/// Walks the whole source chain and stops at the first recognised error, so
/// an [`HttpException`] with a status keeps it even when it wraps something
/// that would classify differently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStatusClassifier;

impl StatusClassifier for DefaultStatusClassifier {
    fn classify(&self, error: &(dyn Error + Send + Sync + 'static)) -> Option<u16> {
        if let Some(status) = classify_cause(error) {
            return Some(status);
        }
        let mut source = error.source();
        while let Some(cause) = source {
            if let Some(status) = classify_cause(cause) {
                return Some(status);
            }
            source = cause.source();
        }
        None
    }
}

fn classify_cause(error: &(dyn Error + 'static)) -> Option<u16> {
    if let Some(exception) = error.downcast_ref::<HttpException>() {
        return exception.status_code().or(exception.status());
    }
    if let Some(io) = error.downcast_ref::<std::io::Error>() {
        return match io.kind() {
            ErrorKind::NotFound => Some(StatusCode::NOT_FOUND),
            ErrorKind::PermissionDenied => Some(StatusCode::FORBIDDEN),
            ErrorKind::TimedOut => Some(StatusCode::GATEWAY_TIMEOUT),
            ErrorKind::InvalidInput | ErrorKind::InvalidData => Some(StatusCode::BAD_REQUEST),
            _ => None,
        }
        .map(|status| status.as_u16());
    }
    if error.downcast_ref::<serde_json::Error>().is_some() {
        return Some(StatusCode::BAD_REQUEST.as_u16());
    }
    if let Some(rejection) = error.downcast_ref::<JsonRejection>() {
        return Some(rejection.status().as_u16());
    }
    if let Some(rejection) = error.downcast_ref::<QueryRejection>() {
        return Some(rejection.status().as_u16());
    }
    if let Some(rejection) = error.downcast_ref::<PathRejection>() {
        return Some(rejection.status().as_u16());
    }
    None
}

/// Replace anything outside `100..600` with 500
pub fn clamp_status_code(status: u16) -> u16 {
    if (100..600).contains(&status) {
        status
    } else {
        FALLBACK_STATUS_CODE
    }
}

/// Resolve the status an error page should be served with
///
/// Order: classifier, then `statusCode`, then `status`, then the default.
/// The result is always clamped, the default included.
pub fn resolve_status_code(
    error: &(dyn Error + Send + Sync + 'static),
    details: &ErrorDetails,
    classifier: Option<&dyn StatusClassifier>,
    default_status_code: u16,
) -> u16 {
    let status = classifier
        .and_then(|classifier| classifier.classify(error))
        .or(details.status_code)
        .or(details.status)
        .unwrap_or(default_status_code);
    clamp_status_code(status)
}

/// Standard reason phrase for a status, e.g. 404 is "Not Found"
pub fn reason_phrase(status: u16) -> Option<&'static str> {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};
    use axum::http::Request;
    use std::collections::HashMap;

    fn resolve(error: &(dyn Error + Send + Sync + 'static), default: u16) -> u16 {
        let details = ErrorDetails::from_error(error);
        resolve_status_code(error, &details, Some(&DefaultStatusClassifier), default)
    }

    #[test]
    fn test_clamp_boundaries() {
        assert_eq!(clamp_status_code(99), 500);
        assert_eq!(clamp_status_code(100), 100);
        assert_eq!(clamp_status_code(599), 599);
        assert_eq!(clamp_status_code(600), 500);
        assert_eq!(clamp_status_code(0), 500);
    }

    #[test]
    fn test_default_status_when_nothing_known() {
        let error = std::fmt::Error;
        assert_eq!(resolve(&error, 500), 500);
        assert_eq!(resolve(&error, 418), 418);
    }

    #[test]
    fn test_default_status_is_clamped() {
        let error = std::fmt::Error;
        assert_eq!(resolve(&error, 1234), 500);
    }

    #[test]
    fn test_status_code_field_wins_over_status() {
        let error = HttpException::new(404, "nope").with_status(410);
        assert_eq!(resolve(&error, 500), 404);
    }

    #[test]
    fn test_status_field_used_without_status_code() {
        let error = HttpException::plain("nope").with_status(410);
        assert_eq!(resolve(&error, 500), 410);
    }

    #[test]
    fn test_out_of_range_fields_are_clamped() {
        assert_eq!(resolve(&HttpException::new(5678, "x"), 500), 500);
        assert_eq!(resolve(&HttpException::new(99, "x"), 500), 500);
        assert_eq!(resolve(&HttpException::new(600, "x"), 500), 500);
        assert_eq!(resolve(&HttpException::new(599, "x"), 500), 599);
        assert_eq!(resolve(&HttpException::new(100, "x"), 500), 100);
    }

    #[test]
    fn test_io_errors_are_classified() {
        let error = std::io::Error::from(ErrorKind::NotFound);
        assert_eq!(resolve(&error, 500), 404);
        let error = std::io::Error::from(ErrorKind::PermissionDenied);
        assert_eq!(resolve(&error, 500), 403);
        let error = std::io::Error::from(ErrorKind::TimedOut);
        assert_eq!(resolve(&error, 500), 504);
        let error = std::io::Error::from(ErrorKind::InvalidInput);
        assert_eq!(resolve(&error, 500), 400);
        let error = std::io::Error::from(ErrorKind::InvalidData);
        assert_eq!(resolve(&error, 500), 400);
        let error = std::io::Error::from(ErrorKind::BrokenPipe);
        assert_eq!(resolve(&error, 418), 418);
    }

    #[test]
    fn test_serde_json_errors_are_bad_requests() {
        let error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(resolve(&error, 500), 400);
    }

    fn query_rejection() -> QueryRejection {
        let uri = "/?n=abc".parse().unwrap();
        Query::<HashMap<String, u16>>::try_from_uri(&uri).unwrap_err()
    }

    #[test]
    fn test_query_rejection_uses_its_status() {
        let rejection = query_rejection();
        let expected = rejection.status().as_u16();
        assert_eq!(expected, 400);
        assert_eq!(resolve(&rejection, 500), expected);
    }

    #[test]
    fn test_wrapped_rejection_is_classified() {
        let error = HttpException::plain("bad query").with_source(query_rejection());
        assert_eq!(resolve(&error, 500), 400);
    }

    #[tokio::test]
    async fn test_json_rejection_uses_its_status() {
        let rejection = Json::<serde_json::Value>::from_request(Request::new(Body::empty()), &())
            .await
            .unwrap_err();
        let expected = rejection.status().as_u16();
        assert_eq!(expected, 415);
        assert_eq!(resolve(&rejection, 500), expected);
    }

    #[tokio::test]
    async fn test_path_rejection_uses_its_status() {
        let (mut parts, _) = Request::new(Body::empty()).into_parts();
        let rejection = Path::<u16>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        let expected = rejection.status().as_u16();
        assert_eq!(resolve(&rejection, 418), expected);
        assert_eq!(resolve(&rejection, 418), 500);
    }

    #[test]
    fn test_classifier_walks_sources() {
        let error = HttpException::plain("load failed")
            .with_source(std::io::Error::from(ErrorKind::NotFound));
        assert_eq!(resolve(&error, 500), 404);
    }

    #[test]
    fn test_outer_exception_status_wins_over_source() {
        let error = HttpException::new(503, "load failed")
            .with_source(std::io::Error::from(ErrorKind::NotFound));
        assert_eq!(resolve(&error, 500), 503);
    }

    #[test]
    fn test_without_classifier_fields_are_used() {
        let error = HttpException::plain("load failed")
            .with_status(502)
            .with_source(std::io::Error::from(ErrorKind::NotFound));
        let details = ErrorDetails::from_error(&error);
        assert_eq!(resolve_status_code(&error, &details, None, 500), 502);
    }

    #[test]
    fn test_classifier_takes_precedence_over_fields() {
        let classifier = |_: &(dyn Error + Send + Sync + 'static)| Some(429u16);
        let error = HttpException::new(503, "slow down");
        let details = ErrorDetails::from_error(&error);
        assert_eq!(resolve_status_code(&error, &details, Some(&classifier), 500), 429);
    }

    #[test]
    fn test_closure_classifier() {
        let classifier = |_: &(dyn Error + Send + Sync + 'static)| Some(451u16);
        let error = std::fmt::Error;
        let details = ErrorDetails::from_error(&error);
        assert_eq!(resolve_status_code(&error, &details, Some(&classifier), 500), 451);
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(500), Some("Internal Server Error"));
        assert_eq!(reason_phrase(599), None);
    }
}
