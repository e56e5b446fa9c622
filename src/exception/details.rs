//! A normalised description of an arbitrary error.

use crate::exception::HttpException;
use serde::Serialize;
use std::error::Error;

/// Name given to errors that do not carry one of their own.
pub const DEFAULT_ERROR_NAME: &str = "Error";

/// Everything the error page knows how to read from an error.
///
/// Only [`HttpException`] carries status, code and name fields. Every other
/// error degrades to its `Display` message and a stack built from its source
/// chain; reading never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub stack: String,
}

impl ErrorDetails {
    pub fn from_error(error: &(dyn Error + Send + Sync + 'static)) -> Self {
        let message = error.to_string();
        let (name, code, status_code, status, trace) = match error.downcast_ref::<HttpException>() {
            Some(exception) => (
                exception.name().unwrap_or(DEFAULT_ERROR_NAME).to_string(),
                exception.code().map(str::to_string),
                exception.status_code(),
                exception.status(),
                exception.trace(),
            ),
            None => (DEFAULT_ERROR_NAME.to_string(), None, None, None, None),
        };

        let mut stack = format!("{name}: {message}");
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        if let Some(trace) = trace {
            stack.push('\n');
            stack.push_str(trace);
        }

        Self {
            name,
            message,
            code,
            status_code,
            status,
            stack,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
