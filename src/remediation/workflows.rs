use crate::config::{PLACEHOLDER_DOMAIN, PLACEHOLDER_SERVICE_NAME, ServiceConfig};
use crate::context::Context;
use crate::environment::Environment;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::path::PathBuf;

lazy_static! {
    static ref PLACEHOLDER_TOKEN: Regex = Regex::new(&format!(
        "{}|{}",
        regex::escape(PLACEHOLDER_DOMAIN),
        regex::escape(PLACEHOLDER_SERVICE_NAME)
    ))
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    Updated,
    /// No placeholder left to replace
    Unchanged,
    NotFound,
    Failed(String),
}

/// CI workflow files, relative to the working tree
pub fn workflow_files() -> Vec<PathBuf> {
    Environment::ALL.iter().map(Environment::workflow_file).collect()
}

fn has_placeholder(content: &str) -> bool {
    content.contains(PLACEHOLDER_SERVICE_NAME) || content.contains(PLACEHOLDER_DOMAIN)
}

/// Whether any existing workflow still carries a placeholder token
pub fn needs_rewrite(ctx: &Context) -> bool {
    workflow_files().iter().any(|file| {
        ctx.fs
            .read_to_string(&ctx.path(file))
            .map(|content| has_placeholder(&content))
            .unwrap_or(false)
    })
}

/// Replace the placeholder service name and domain with the configured values.
///
/// Both tokens are replaced in a single pass, so inserted values are never rescanned.
pub fn substitute(content: &str, config: &ServiceConfig) -> String {
    PLACEHOLDER_TOKEN
        .replace_all(content, |caps: &Captures| {
            if &caps[0] == PLACEHOLDER_DOMAIN {
                config.workers_domain.clone()
            } else {
                config.service_name.clone()
            }
        })
        .into_owned()
}

/// Rewrite the placeholder tokens in every workflow file that exists
pub fn rewrite_workflows(
    ctx: &Context,
    config: &ServiceConfig,
) -> Vec<(PathBuf, WorkflowOutcome)> {
    workflow_files()
        .into_iter()
        .map(|file| {
            let path = ctx.path(&file);
            let name = file.display().to_string();

            if !ctx.fs.is_file(&path) {
                ctx.output.info(&format!("{} not found", name));
                return (file, WorkflowOutcome::NotFound);
            }

            let result = ctx.fs.read_to_string(&path).and_then(|content| {
                if !has_placeholder(&content) {
                    return Ok(WorkflowOutcome::Unchanged);
                }
                ctx.fs.write(&path, &substitute(&content, config))?;
                Ok(WorkflowOutcome::Updated)
            });

            let outcome = match result {
                Ok(WorkflowOutcome::Updated) => {
                    ctx.output.success(&format!("Updated {}", name));
                    WorkflowOutcome::Updated
                }
                Ok(other) => {
                    ctx.output.dimmed(&format!("{} has no placeholders", name));
                    other
                }
                Err(e) => {
                    ctx.output.error(&format!("Could not update {}: {:#}", name, e));
                    WorkflowOutcome::Failed(format!("{:#}", e))
                }
            };

            (file, outcome)
        })
        .collect()
}
