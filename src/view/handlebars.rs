//! Views backed by Handlebars templates.

use crate::error::{ErrorPageError, Result};
use crate::view::{ViewError, ViewRenderer};
use async_trait::async_trait;
use handlebars::{DirectorySourceOptions, Handlebars};
use std::path::Path;

/// A set of named Handlebars templates
///
/// Templates are registered up front; rendering a name that was never
/// registered fails with [`ViewError::NotFound`].
#[derive(Clone)]
pub struct HandlebarsViews {
    handlebars: Handlebars<'static>,
}

impl HandlebarsViews {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    /// Register a template from source
    pub fn with_template(mut self, name: &str, source: &str) -> Result<Self> {
        self.handlebars.register_template_string(name, source)?;
        Ok(self)
    }

    /// Register every `*.{extension}` file under `dir`, named by relative path
    pub fn from_directory(dir: impl AsRef<Path>, extension: &str) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ErrorPageError::TemplateDirectory {
                path: dir.display().to_string(),
                message: "not a directory".to_string(),
            });
        }

        let mut views = Self::new();
        let mut options = DirectorySourceOptions::default();
        options.tpl_extension = format!(".{}", extension.trim_start_matches('.'));
        views.handlebars.register_templates_directory(dir, options)?;
        tracing::debug!(
            "Registered {} views from {}",
            views.handlebars.get_templates().len(),
            dir.display()
        );
        Ok(views)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

impl Default for HandlebarsViews {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ViewRenderer for HandlebarsViews {
    async fn render_view(&self, view: &str, context: &serde_json::Value) -> std::result::Result<String, ViewError> {
        if !self.has_view(view) {
            return Err(ViewError::not_found(view));
        }
        self.handlebars
            .render(view, context)
            .map_err(|e| ViewError::render(view, e))
    }
}
