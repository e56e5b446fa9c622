use async_trait::async_trait;
use serde::Serialize;
use std::error::Error;

pub mod handlebars;

pub use self::handlebars::HandlebarsViews;

/// A failed view render
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Failed to lookup view \"{view}\"")]
    NotFound { view: String },

    #[error("Failed to render view \"{view}\": {source}")]
    Render {
        view: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ViewError {
    pub fn not_found(view: impl Into<String>) -> Self {
        Self::NotFound { view: view.into() }
    }

    pub fn render(view: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Render {
            view: view.into(),
            source: source.into(),
        }
    }
}

/// Renders a named view with a serializable context
#[async_trait]
pub trait ViewRenderer: Send + Sync + 'static {
    async fn render_view(&self, view: &str, context: &serde_json::Value) -> Result<String, ViewError>;
}

/// Serialize `context` and hand it to `renderer`
pub async fn render_with<C>(renderer: &dyn ViewRenderer, view: &str, context: &C) -> Result<String, ViewError>
where
    C: Serialize + Sync,
{
    let value = serde_json::to_value(context).map_err(|e| ViewError::render(view, e))?;
    renderer.render_view(view, &value).await
}
