//! Thin adapter over the `git` command line.

use crate::context::Context;
use crate::environment::Environment;
use crate::traits::{CommandOutcome, FailurePolicy, run_command};
use crate::version::VersionTag;
use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, FixedOffset};

pub const REMOTE: &str = "origin";
pub const MAIN_BRANCH: &str = "main";

const FIELD_SEPARATOR: char = '\u{1f}';

/// A commit as printed by `git log`
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    pub short_hash: String,
    pub author: String,
    pub date: Option<DateTime<FixedOffset>>,
    pub subject: String,
}

impl CommitInfo {
    fn parse(line: &str) -> Result<Self> {
        let mut fields = line.trim().split(FIELD_SEPARATOR);
        let short_hash = fields
            .next()
            .filter(|h| !h.is_empty())
            .context("git log returned no commit")?
            .to_string();
        let author = fields.next().unwrap_or_default().to_string();
        let date = fields
            .next()
            .and_then(|d| DateTime::parse_from_rfc3339(d.trim()).ok());
        let subject = fields.next().unwrap_or_default().to_string();

        Ok(Self {
            short_hash,
            author,
            date,
            subject,
        })
    }
}

pub struct Git<'a> {
    ctx: &'a Context,
}

impl<'a> Git<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    fn run(&self, args: &[&str], policy: FailurePolicy) -> Result<CommandOutcome> {
        run_command(&*self.ctx.command, "git", args, &self.ctx.root, policy)
    }

    /// URL of the shared remote
    pub fn remote_url(&self) -> Result<CommandOutcome> {
        self.run(&["remote", "get-url", REMOTE], FailurePolicy::Capture)
    }

    /// Read-only listing of the remote's branches, proving it is reachable
    pub fn ls_remote(&self) -> Result<CommandOutcome> {
        self.run(&["ls-remote", "--heads", REMOTE], FailurePolicy::Capture)
    }

    /// Uncommitted changes, one per line; empty when the tree is clean
    pub fn uncommitted_changes(&self) -> Result<Vec<String>> {
        let outcome = self.run(&["status", "--porcelain"], FailurePolicy::Propagate)?;
        Ok(outcome
            .stdout()
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Newest deployment tag of `environment` by version sort
    pub fn latest_tag(&self, environment: Environment) -> Result<Option<String>> {
        let pattern = environment.tag_pattern();
        let outcome = self.run(
            &["tag", "-l", &pattern, "--sort=-version:refname"],
            FailurePolicy::Propagate,
        )?;

        Ok(outcome
            .stdout()
            .and_then(|out| out.lines().next())
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty()))
    }

    /// Version part of the newest deployment tag of `environment`
    pub fn latest_version(&self, environment: Environment) -> Result<Option<String>> {
        let prefix = format!("{}-", environment);
        Ok(self
            .latest_tag(environment)?
            .map(|tag| tag.strip_prefix(&prefix).unwrap_or(&tag).to_string()))
    }

    pub fn tag_exists(&self, name: &str) -> Result<bool> {
        let reference = format!("refs/tags/{}", name);
        match self.run(&["rev-parse", "-q", "--verify", &reference], FailurePolicy::Capture)? {
            CommandOutcome::Success { .. } => Ok(true),
            CommandOutcome::Failure { code: Some(_), .. } => Ok(false),
            CommandOutcome::Failure {
                code: None,
                diagnostic,
            } => anyhow::bail!("Failed to run git: {}", diagnostic),
        }
    }

    /// Short hash of the commit `reference` points to, or `None` if it doesn't resolve
    pub fn resolve_commit(&self, reference: &str) -> Result<Option<String>> {
        let revision = format!("{}^{{commit}}", reference);
        let outcome = self.run(&["rev-parse", "--short", &revision], FailurePolicy::Capture)?;
        Ok(outcome.stdout().map(str::to_string))
    }

    pub fn create_annotated_tag(&self, tag: &VersionTag, commit: &str) -> Result<()> {
        let name = tag.name();
        let message = tag.annotation();
        self.run(
            &["tag", "-a", &name, commit, "-m", &message],
            FailurePolicy::Propagate,
        )?;
        Ok(())
    }

    pub fn push_tag(&self, tag: &VersionTag) -> Result<()> {
        let name = tag.name();
        self.run(&["push", REMOTE, &name], FailurePolicy::Propagate)?;
        Ok(())
    }

    /// Latest commit reachable from `revision`
    pub fn last_commit(&self, revision: &str) -> Result<CommitInfo> {
        let outcome = self.run(
            &["log", "-1", "--format=%h%x1f%an%x1f%aI%x1f%s", revision],
            FailurePolicy::Propagate,
        )?;
        CommitInfo::parse(outcome.stdout().unwrap_or_default())
    }

    /// Subject line of an annotated tag's message
    pub fn tag_subject(&self, name: &str) -> Result<Option<String>> {
        let outcome = self.run(
            &["tag", "-l", "--format=%(contents:subject)", name],
            FailurePolicy::Propagate,
        )?;
        Ok(outcome
            .stdout()
            .map(str::to_string)
            .filter(|s| !s.is_empty()))
    }
}
