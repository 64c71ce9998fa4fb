//! Template rendering.
//!
//! Documents are handlebars templates. Every partial is registered under its
//! document name, so `{{> footer}}` includes `partials/footer.mjml` and
//! `{{> shared/footer}}` includes `partials/shared/footer.mjml`.
//!
//! Output is not HTML-escaped: the result is MJML source, not HTML.

use handlebars::{Handlebars, handlebars_helper, no_escape};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::source::Document;

/// A partial that does not parse.
#[derive(Debug, Error)]
#[error("invalid partial `{name}`")]
pub struct PartialError {
    pub name: String,
    #[source]
    source: Box<handlebars::TemplateError>,
}

#[derive(Debug, Error)]
#[error("template execution failed")]
pub struct RenderError(#[source] Box<handlebars::RenderError>);

// `{{exp "user.name"}}` -> `{{ user.name }}`, for a second templating stage.
handlebars_helper!(expression: |expr: str| format!("{{{{ {expr} }}}}"));

/// Renders documents against a fixed set of partials.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Create a renderer with all `partials` available for inclusion.
    pub fn new(partials: &[Document]) -> Result<Self, PartialError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper("exp", Box::new(expression));
        registry.register_helper("expression", Box::new(expression));

        for partial in partials {
            registry
                .register_partial(&partial.name, &partial.content)
                .map_err(|e| PartialError {
                    name: partial.name.clone(),
                    source: Box::new(e),
                })?;
        }

        Ok(Self { registry })
    }

    /// Render `document` against `data`.
    pub fn render(&self, document: &Document, data: &Map<String, Value>) -> Result<String, RenderError> {
        self.registry
            .render_template(&document.content, data)
            .map_err(|e| RenderError(Box::new(e)))
    }
}
