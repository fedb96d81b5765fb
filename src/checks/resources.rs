use crate::config::ServiceConfig;
use crate::context::Context;
use crate::environment::Environment;
use crate::platform::Wrangler;
use crate::traits::CommandOutcome;
use anyhow::Result;

/// Which environments already have a worker on the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub present: Vec<(Environment, String)>,
    pub missing: Vec<(Environment, String)>,
}

impl ResourceReport {
    /// Look for each environment's worker name in the listing output
    pub fn from_listing(listing: &str, config: &ServiceConfig) -> Self {
        let (present, missing) = Environment::ALL
            .iter()
            .map(|env| (*env, env.worker_name(config)))
            .partition(|(_, name)| mentions(listing, name));

        Self { present, missing }
    }

    /// Every environment is provisioned
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn none_present(&self) -> bool {
        self.present.is_empty()
    }
}

/// Whether `name` appears in `listing` as a whole worker name.
///
/// Worker names are made of letters, digits, `-` and `_`, so a bare
/// `billing` does not match inside `billing-dev`.
fn mentions(listing: &str, name: &str) -> bool {
    listing
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .any(|word| word == name)
}

/// List workers once and report each environment's worker.
///
/// Returns `None` when the listing itself failed.
pub fn check_resources(ctx: &Context, config: &ServiceConfig) -> Result<Option<ResourceReport>> {
    ctx.output.subsection("Workers");

    let listing = match Wrangler::new(ctx).list_workers()? {
        CommandOutcome::Success { stdout, stderr } => format!("{}\n{}", stdout, stderr),
        CommandOutcome::Failure { diagnostic, .. } => {
            ctx.output.warning("Could not list workers on the account");
            if !diagnostic.is_empty() {
                ctx.output.dimmed(&diagnostic);
            }
            return Ok(None);
        }
    };

    let report = ResourceReport::from_listing(&listing, config);

    for (env, name) in &report.present {
        ctx.output.success(&format!("{}: {} exists", env, name));
    }
    for (env, name) in &report.missing {
        ctx.output.info(&format!("{}: {} not found", env, name));
    }

    Ok(Some(report))
}
