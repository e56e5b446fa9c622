use crate::config::ContextFields;
use crate::exception::ErrorDetails;
use crate::status::reason_phrase;
use serde::Serialize;

/// Data handed to the error view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub error: ErrorContext,
}

/// The `error` object inside a [`RenderContext`]
///
/// `stack` is always serialized, as `null` when stacks are hidden. The
/// extended fields are left out entirely in minimal mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    pub status_code: u16,
    pub message: String,
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl RenderContext {
    pub fn new(
        status_code: u16,
        details: ErrorDetails,
        include_error_stack: bool,
        fields: ContextFields,
    ) -> Self {
        let stack = include_error_stack.then_some(details.stack);
        let error = match fields {
            ContextFields::Minimal => ErrorContext {
                status_code,
                message: details.message,
                stack,
                status: None,
                code: None,
                name: None,
                status_message: None,
            },
            ContextFields::Extended => ErrorContext {
                status_code,
                message: details.message,
                stack,
                status: Some(status_code),
                code: details.code,
                name: Some(details.name),
                status_message: reason_phrase(status_code).map(str::to_string),
            },
        };
        Self { error }
    }

    pub fn status_code(&self) -> u16 {
        self.error.status_code
    }
}
