//! Prompt Loader
//!
//! Loads prompt templates from the override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::domain::TripPreferences;

/// Context for rendering the itinerary template
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub destination: String,
    pub vibe: String,
    pub budget: String,
}

impl PromptContext {
    /// Build the context from submitted preferences
    pub fn from_preferences(prefs: &TripPreferences) -> Self {
        debug!(destination = %prefs.destination, "PromptContext::from_preferences: called");
        Self {
            destination: prefs.destination.clone(),
            vibe: prefs.vibe.as_str().to_string(),
            budget: prefs.budget.as_str().to_string(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `~/.config/weekendwanderer/prompts/`)
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader, using `override_dir` only if it exists
    pub fn new(override_dir: impl AsRef<Path>) -> Self {
        let override_dir = override_dir.as_ref();
        let exists = override_dir.is_dir();
        debug!(?override_dir, %exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            override_dir: if exists { Some(override_dir.to_path_buf()) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    // Prompts are plain text; HTML escaping would mangle names like "Napa & Sonoma"
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in override directory");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt override {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in override directory");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        debug!(%template_name, destination = %context.destination, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!(
            "Rendering template '{}' for {} ({}, {})",
            template_name, context.destination, context.vibe, context.budget
        );

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the itinerary system instruction
    pub fn itinerary_prompt(&self, prefs: &TripPreferences) -> Result<String> {
        debug!("PromptLoader::itinerary_prompt: called");
        self.render("itinerary", &PromptContext::from_preferences(prefs))
    }
}
