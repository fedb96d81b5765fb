//! Opt-in fixes offered by `edgeops init`.
//!
//! Multi-file operations are not transactional: every file is reported on
//! its own and a re-run picks up where a failed run stopped.

pub mod manifests;
pub mod provision;
pub mod workflows;

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Render a handlebars template without HTML escaping
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .render_template(template, data)
        .context("Failed to render template")
}
