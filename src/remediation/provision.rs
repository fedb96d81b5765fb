use super::render;
use crate::config::ServiceConfig;
use crate::context::Context;
use crate::environment::Environment;
use crate::platform::Wrangler;
use crate::traits::CommandOutcome;
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;
use tracing::warn;

const PLACEHOLDER_WORKER: &str = r#"export default {
  async fetch() {
    return new Response("Hello from {{environment}}!");
  },
};
"#;

#[derive(Serialize)]
struct WorkerData<'a> {
    environment: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub created: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Create a placeholder worker for each environment.
///
/// Each environment is attempted even when an earlier one failed.
pub fn provision_workers(
    ctx: &Context,
    config: &ServiceConfig,
    environments: &[Environment],
) -> ProvisionSummary {
    let mut summary = ProvisionSummary::default();

    for env in environments {
        let name = env.worker_name(config);
        match provision_one(ctx, *env, &name) {
            Ok(()) => {
                ctx.output.success(&format!("Created worker {}", name));
                summary.created.push(name);
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                ctx.output.error(&format!("Failed to create worker {}: {}", name, reason));
                summary.failed.push((name, reason));
            }
        }
    }

    summary
}

fn provision_one(ctx: &Context, env: Environment, name: &str) -> Result<()> {
    // Removed on drop, whichever way this function returns
    let workdir = tempfile::Builder::new()
        .prefix("edgeops-provision-")
        .tempdir()
        .context("Failed to create a temporary directory")?;

    let script = workdir.path().join("index.js");
    let content = render(
        PLACEHOLDER_WORKER,
        &WorkerData {
            environment: env.as_str(),
        },
    )?;
    ctx.fs.write(&script, &content)?;

    let outcome = Wrangler::new(ctx).deploy(&script, name);

    if let Err(e) = workdir.close() {
        warn!(error = %e, "failed to remove temporary provisioning directory");
    }

    match outcome? {
        CommandOutcome::Success { .. } => Ok(()),
        CommandOutcome::Failure { diagnostic, .. } => anyhow::bail!(diagnostic),
    }
}
