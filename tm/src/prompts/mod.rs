//! Prompt templates
//!
//! Handlebars templates for every generation-service call the pipeline
//! makes. Embedded defaults ship in the binary; a `prompts/` directory
//! next to the working directory (or an explicit override dir) wins when
//! present.

mod embedded;

use std::path::PathBuf;

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

/// Context for the search-stage templates (lodging, dining, activities,
/// and the per-mode transport searches)
#[derive(Debug, Clone, Serialize, Default)]
pub struct SearchContext {
    pub prompt: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub duration_days: u32,
    pub travelers: u32,
    pub budget: Option<f64>,
    pub lodging_address: Option<String>,
    pub dietary: Option<String>,
    pub limit: usize,
}

/// Context for the itinerary assembly template
#[derive(Debug, Clone, Serialize, Default)]
pub struct ItineraryContext {
    pub prompt: String,
    pub duration_days: u32,
    pub start_date: String,
    pub travelers: u32,
    pub lodging_summary: Option<String>,
    pub dining_summary: Option<String>,
    pub activities_summary: Option<String>,
    pub dietary: Option<String>,
}

/// Context for the route-analysis template
#[derive(Debug, Clone, Serialize)]
pub struct RouteContext {
    pub origin: String,
    pub destination: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    hbs: Handlebars<'static>,
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Loader with a disk override directory checked before the embedded
    /// defaults
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        debug!(?override_dir, "PromptLoader::new: called");
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(handlebars::no_escape);
        Self { hbs, override_dir }
    }

    /// Loader that only uses embedded templates
    pub fn embedded_only() -> Self {
        Self::new(None)
    }

    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{name}.pmt"));
            if path.exists() {
                debug!(?path, "load_template: using override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("failed to read prompt override {}: {e}", path.display()));
            }
        }
        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("unknown prompt template: {name}"))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String> {
        debug!(%name, "PromptLoader::render: called");
        let template = self.load_template(name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("failed to render prompt '{name}': {e}"))
    }
}
