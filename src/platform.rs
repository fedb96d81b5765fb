//! Adapter over the `wrangler` CLI.
//!
//! The CLI only offers human-readable output for identity and listing, so
//! everything that parses that text lives here. When a CLI release changes
//! its wording, this is the one file to update.

use crate::context::Context;
use crate::traits::{CommandOutcome, FailurePolicy, run_command};
use anyhow::Result;
use std::path::Path;

/// wrangler is run through npx so the project-local install is used
const LAUNCHER: &str = "npx";
const CLI: &str = "wrangler";

/// Listing command whose output names every worker on the account
pub const LIST_WORKERS_ARGS: &[&str] = &["deployments", "list"];

pub const LOGIN_COMMAND: &str = "npx wrangler login";

pub const COMPATIBILITY_DATE: &str = "2024-01-01";

/// Phrases `wrangler whoami` prints when there is no usable session
const UNAUTHENTICATED_MARKERS: &[&str] = &["not logged in", "not authenticated"];

/// Session state as reported by `wrangler whoami`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    NotAuthenticated,
    /// The identity check itself failed
    Unavailable(String),
}

impl AuthStatus {
    /// Interpret the outcome of `wrangler whoami`
    pub fn from_whoami(outcome: &CommandOutcome) -> Self {
        match outcome.combined_output() {
            None => AuthStatus::Unavailable(outcome.diagnostic().unwrap_or_default().to_string()),
            Some(text) => {
                let text = text.to_lowercase();
                if UNAUTHENTICATED_MARKERS.iter().any(|m| text.contains(m)) {
                    AuthStatus::NotAuthenticated
                } else {
                    AuthStatus::Authenticated
                }
            }
        }
    }
}

pub struct Wrangler<'a> {
    ctx: &'a Context,
}

impl<'a> Wrangler<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    fn run(&self, args: &[&str], dir: &Path) -> Result<CommandOutcome> {
        let mut full = vec![CLI];
        full.extend_from_slice(args);
        run_command(&*self.ctx.command, LAUNCHER, &full, dir, FailurePolicy::Capture)
    }

    pub fn whoami(&self) -> Result<AuthStatus> {
        let outcome = self.run(&["whoami"], &self.ctx.root)?;
        Ok(AuthStatus::from_whoami(&outcome))
    }

    /// Raw listing output, searched by substring for worker names
    pub fn list_workers(&self) -> Result<CommandOutcome> {
        self.run(LIST_WORKERS_ARGS, &self.ctx.root)
    }

    /// Deploy `script` as a new worker called `name`
    pub fn deploy(&self, script: &Path, name: &str) -> Result<CommandOutcome> {
        let dir = script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.ctx.root.clone());
        let script = script.to_string_lossy().into_owned();
        self.run(
            &[
                "deploy",
                script.as_str(),
                "--name",
                name,
                "--compatibility-date",
                COMPATIBILITY_DATE,
            ],
            &dir,
        )
    }
}
