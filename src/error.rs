use thiserror::Error;

pub type Result<T> = std::result::Result<T, ErrorPageError>;

#[derive(Debug, Error)]
pub enum ErrorPageError {
    #[error("Invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },

    #[error("Template registration failed: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Failed to load templates from {path}: {message}")]
    TemplateDirectory { path: String, message: String },
}

impl ErrorPageError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}
