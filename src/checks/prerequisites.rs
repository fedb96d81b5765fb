use super::{CheckResult, CheckStatus};
use crate::context::Context;
use crate::traits::{CommandOutcome, FailurePolicy, run_command};
use crate::version::{compare_versions, extract_version};
use anyhow::Result;
use std::cmp::Ordering;

/// A command-line tool the release workflow depends on
#[derive(Debug, Clone, Copy)]
pub struct Tool {
    pub name: &'static str,
    pub program: &'static str,
    pub args: &'static [&'static str],
    pub minimum: &'static str,
    pub install_hint: &'static str,
}

pub const REQUIRED_TOOLS: &[Tool] = &[
    Tool {
        name: "git",
        program: "git",
        args: &["--version"],
        minimum: "2.30.0",
        install_hint: "https://git-scm.com/downloads",
    },
    Tool {
        name: "npm",
        program: "npm",
        args: &["--version"],
        minimum: "8.0.0",
        install_hint: "https://nodejs.org/",
    },
    Tool {
        name: "node",
        program: "node",
        args: &["--version"],
        minimum: "18.0.0",
        install_hint: "https://nodejs.org/",
    },
    Tool {
        name: "wrangler",
        program: "npx",
        args: &["wrangler", "--version"],
        minimum: "3.0.0",
        install_hint: "npm install --save-dev wrangler",
    },
];

/// Check a single tool and report it
pub fn check_tool(ctx: &Context, tool: &Tool) -> Result<CheckResult> {
    let outcome = run_command(
        &*ctx.command,
        tool.program,
        tool.args,
        &ctx.root,
        FailurePolicy::Capture,
    )?;

    let banner = match outcome {
        CommandOutcome::Success { stdout, stderr } => format!("{}\n{}", stdout, stderr),
        CommandOutcome::Failure { .. } => {
            ctx.output.error(&format!("{} is not installed", tool.name));
            ctx.output.hint("Install it from", tool.install_hint);
            return Ok(CheckResult::new(tool.name, None, CheckStatus::Fail));
        }
    };

    let Some(version) = extract_version(&banner) else {
        ctx.output.warning(&format!(
            "{} is installed but its version could not be determined",
            tool.name
        ));
        return Ok(CheckResult::new(tool.name, None, CheckStatus::Warn));
    };

    let status = if compare_versions(&version, tool.minimum) == Ordering::Less {
        ctx.output.warning(&format!(
            "{} {} is older than the recommended {}",
            tool.name, version, tool.minimum
        ));
        CheckStatus::Warn
    } else {
        ctx.output.success(&format!("{} {}", tool.name, version));
        CheckStatus::Pass
    };

    Ok(CheckResult::new(tool.name, Some(version), status))
}

/// Check every required tool, reporting all of them before returning
pub fn check_prerequisites(ctx: &Context) -> Result<Vec<CheckResult>> {
    ctx.output.subsection("Prerequisites");

    REQUIRED_TOOLS
        .iter()
        .map(|tool| check_tool(ctx, tool))
        .collect()
}
