//! Prompt Renderer - Bind variables into templates using Handlebars
//!
//! This module provides the PromptRenderer struct which uses Handlebars to
//! render prompt templates with trip variables.

use handlebars::Handlebars;

use super::template::{PromptTemplate, PromptVariables};
use crate::error::{Result, TripPlanError};

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Create a new PromptRenderer
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // Unbound variables are errors, never silent empty strings
        handlebars.set_strict_mode(true);
        // User input goes in verbatim
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Render a template with the given bindings
    ///
    /// # Arguments
    /// * `template` - Rendered text is returned as-is; deferred bodies are bound
    /// * `variables` - Must bind every required variable of a deferred template
    ///
    /// # Returns
    /// The final prompt text, or `MissingField` naming the first unbound variable
    pub fn render(&self, template: &PromptTemplate, variables: &PromptVariables) -> Result<String> {
        if let Some(missing) = template.first_missing(variables) {
            return Err(TripPlanError::MissingField(missing.to_string()));
        }

        match template {
            PromptTemplate::Rendered(text) => Ok(text.clone()),
            PromptTemplate::Deferred { body, .. } => self.render_str(body, variables),
        }
    }

    /// Render a raw template string with the given bindings
    pub fn render_str(&self, template: &str, variables: &PromptVariables) -> Result<String> {
        self.handlebars
            .render_template(template, variables)
            .map_err(|e| TripPlanError::Render(format!("Failed to render template: {}", e)))
    }
}
