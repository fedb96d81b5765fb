use crate::context::Context;
use crate::git::{Git, REMOTE};
use crate::traits::CommandOutcome;
use anyhow::Result;

/// Why the shared remote can't be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteProblem {
    NotConfigured,
    Unreachable(String),
}

/// Confirm the remote is configured and answers a read-only listing
pub fn check_remote(ctx: &Context) -> Result<Result<String, RemoteProblem>> {
    ctx.output.subsection("Repository");
    let git = Git::new(ctx);

    let url = match git.remote_url()? {
        CommandOutcome::Success { stdout, .. } if !stdout.trim().is_empty() => {
            stdout.trim().to_string()
        }
        _ => {
            ctx.output.error(&format!("No '{}' remote is configured", REMOTE));
            ctx.output.hint("Add one with", &format!("git remote add {} <url>", REMOTE));
            return Ok(Err(RemoteProblem::NotConfigured));
        }
    };

    if let CommandOutcome::Failure { diagnostic, .. } = git.ls_remote()? {
        ctx.output.error(&format!("Remote repository {} is not reachable", url));
        if !diagnostic.is_empty() {
            ctx.output.dimmed(&diagnostic);
        }
        ctx.output.hint(
            "Check your network connection and git credentials, then try",
            &format!("git ls-remote {}", REMOTE),
        );
        return Ok(Err(RemoteProblem::Unreachable(diagnostic)));
    }

    ctx.output.success(&format!("Remote repository reachable: {}", url));
    Ok(Ok(url))
}
