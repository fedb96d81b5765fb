//! `edgeops tag create`: create and push a deployment tag.
//!
//! The command walks a fixed sequence of gates. Each gate either yields a
//! validated value, fails the run, or lets the operator cancel. Invalid
//! input is not re-prompted; the operator runs the command again.
//!
//! Two operators tagging the same repository at once is unsupported. Only
//! the remote's own ref update check stands between racing pushes.

use super::CommandStatus;
use crate::config::ServiceConfig;
use crate::context::Context;
use crate::environment::Environment;
use crate::git::{Git, REMOTE};
use crate::version::VersionTag;
use anyhow::Result;

/// Why the tag workflow stopped before pushing
#[derive(Debug, PartialEq, Eq)]
pub enum Stop {
    Fail(String),
    Cancel,
}

/// Result of one step of the tag workflow
pub type Gate<T> = std::result::Result<T, Stop>;

impl Stop {
    /// Report why the run stopped and map it to the command status
    fn halt(self, ctx: &Context) -> CommandStatus {
        match self {
            Stop::Fail(message) => {
                ctx.output.error(&message);
                CommandStatus::Failed
            }
            Stop::Cancel => {
                ctx.output.info("Cancelled, no tag was created");
                CommandStatus::Cancelled
            }
        }
    }
}

pub struct TagCreateCommand;

impl TagCreateCommand {
    pub fn execute(ctx: &Context) -> Result<CommandStatus> {
        ctx.output.section("Create Deployment Tag");
        let config = ServiceConfig::resolve(ctx)?;
        let git = Git::new(ctx);

        match Self::require_clean_tree(ctx, &git)? {
            Ok(()) => {}
            Err(stop) => return Ok(stop.halt(ctx)),
        }

        let environment = match Self::select_environment(ctx)? {
            Ok(env) => env,
            Err(stop) => return Ok(stop.halt(ctx)),
        };

        Self::show_latest_versions(ctx, &git);

        let tag = match Self::enter_version(ctx, &git, environment)? {
            Ok(tag) => tag,
            Err(stop) => return Ok(stop.halt(ctx)),
        };

        let commit = match Self::select_commit(ctx, &git)? {
            Ok(commit) => commit,
            Err(stop) => return Ok(stop.halt(ctx)),
        };

        match Self::confirm(ctx, &config, &tag, &commit)? {
            Ok(()) => {}
            Err(stop) => return Ok(stop.halt(ctx)),
        }

        match Self::create_and_push(ctx, &git, &tag, &commit) {
            Ok(()) => {}
            Err(stop) => return Ok(stop.halt(ctx)),
        }

        ctx.output.blank();
        ctx.output.success(&format!("Tag {} pushed to {}", tag.name(), REMOTE));
        ctx.output.key_value("Tag", &tag.name());
        ctx.output.key_value("Commit", &commit);
        ctx.output.key_value("Message", &tag.annotation());
        ctx.output.key_value_highlight("URL", &tag.environment.url(&config));
        ctx.output.dimmed(&format!(
            "The {} deployment workflow runs when it sees the new tag",
            tag.environment
        ));

        Ok(CommandStatus::Completed)
    }

    pub(crate) fn require_clean_tree(ctx: &Context, git: &Git) -> Result<Gate<()>> {
        let changes = git.uncommitted_changes()?;
        if changes.is_empty() {
            return Ok(Ok(()));
        }

        for change in changes.iter().take(10) {
            ctx.output.dimmed(change);
        }
        Ok(Err(Stop::Fail(
            "Working tree has uncommitted changes. Commit or stash them first.".to_string(),
        )))
    }

    pub(crate) fn select_environment(ctx: &Context) -> Result<Gate<Environment>> {
        let answer = ctx.input.text("Environment to deploy (qa/prod):", None)?;

        Ok(match Environment::parse(&answer) {
            Ok(env) if env.is_taggable() => Ok(env),
            _ => Err(Stop::Fail(format!(
                "Invalid environment '{}'. Choose qa or prod.",
                answer.trim()
            ))),
        })
    }

    /// Latest version per environment, for context. Lookup failures are not fatal.
    pub(crate) fn show_latest_versions(ctx: &Context, git: &Git) {
        ctx.output.subsection("Current versions");
        for env in Environment::TAGGABLE {
            let current = match git.latest_version(env) {
                Ok(Some(version)) => version,
                Ok(None) => "none".to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, %env, "failed to look up latest tag");
                    "unknown".to_string()
                }
            };
            ctx.output.key_value(env.as_str(), &current);
        }
    }

    pub(crate) fn enter_version(
        ctx: &Context,
        git: &Git,
        environment: Environment,
    ) -> Result<Gate<VersionTag>> {
        let answer = ctx.input.text("Version (e.g. 1.4.0):", None)?;

        let tag = match VersionTag::new(environment, &answer) {
            Ok(tag) => tag,
            Err(e) => return Ok(Err(Stop::Fail(e.to_string()))),
        };

        if git.tag_exists(&tag.name())? {
            return Ok(Err(Stop::Fail(format!(
                "Tag {} already exists",
                tag.name()
            ))));
        }

        Ok(Ok(tag))
    }

    pub(crate) fn select_commit(ctx: &Context, git: &Git) -> Result<Gate<String>> {
        let answer = ctx.input.text("Commit to tag (blank for HEAD):", Some("HEAD"))?;
        let reference = match answer.trim() {
            "" => "HEAD",
            other => other,
        };

        Ok(match git.resolve_commit(reference)? {
            Some(commit) => Ok(commit),
            None => Err(Stop::Fail(format!(
                "'{}' does not name a commit",
                reference
            ))),
        })
    }

    pub(crate) fn confirm(
        ctx: &Context,
        config: &ServiceConfig,
        tag: &VersionTag,
        commit: &str,
    ) -> Result<Gate<()>> {
        ctx.output.subsection("Summary");
        ctx.output.key_value("Environment", tag.environment.as_str());
        ctx.output.key_value("Version", &tag.version);
        ctx.output.key_value_highlight("Tag", &tag.name());
        ctx.output.key_value("Commit", commit);
        ctx.output.key_value("URL", &tag.environment.url(config));

        let answer = ctx
            .input
            .text(&format!("Create and push {}? (y/N)", tag.name()), None)?;

        Ok(if is_affirmative(&answer) {
            Ok(())
        } else {
            Err(Stop::Cancel)
        })
    }

    pub(crate) fn create_and_push(
        ctx: &Context,
        git: &Git,
        tag: &VersionTag,
        commit: &str,
    ) -> Gate<()> {
        if let Err(e) = git.create_annotated_tag(tag, commit) {
            return Err(Stop::Fail(format!(
                "Failed to create tag {}: {:#}",
                tag.name(),
                e
            )));
        }
        ctx.output.success(&format!("Created tag {}", tag.name()));

        if let Err(e) = git.push_tag(tag) {
            ctx.output.hint(
                "The tag exists locally. Push it again with",
                &format!("git push {} {}", REMOTE, tag.name()),
            );
            return Err(Stop::Fail(format!(
                "Failed to push tag {}: {:#}",
                tag.name(),
                e
            )));
        }

        Ok(())
    }
}

/// Only an explicit yes goes ahead
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{TestContext, text};
    use crate::traits::MockCommandResult;

    #[test]
    fn test_stop_maps_to_command_status() {
        let t = TestContext::new();

        assert_eq!(Stop::Fail("boom".to_string()).halt(&t.ctx), CommandStatus::Failed);
        assert_eq!(Stop::Cancel.halt(&t.ctx), CommandStatus::Cancelled);
        assert_eq!(t.output.get_errors(), vec!["boom".to_string()]);
    }

    fn clean_repo() -> Vec<MockCommandResult> {
        vec![
            MockCommandResult::ok("git status --porcelain", ""),
            MockCommandResult::ok("git tag -l qa-*", "qa-1.3.0\nqa-1.2.0\n"),
            MockCommandResult::ok("git tag -l prod-*", "prod-1.2.0\n"),
            MockCommandResult::fail("git rev-parse -q --verify refs/tags/", 1, ""),
            MockCommandResult::ok("git rev-parse --short HEAD^{commit}", "9f8e7d6\n"),
        ]
    }

    #[test]
    fn test_creates_and_pushes_tag() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("qa"), text("1.4.0"), text(""), text("y")]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        let calls = t.command.calls();
        assert!(calls.contains(
            &"git tag -a qa-1.4.0 9f8e7d6 -m Deploy to qa - version 1.4.0".to_string()
        ));
        assert_eq!(calls.last().unwrap(), "git push origin qa-1.4.0");
        assert_eq!(t.input.remaining(), 0);
    }

    #[test]
    fn test_environment_is_case_insensitive() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("PROD"), text("2.0.0-rc1"), text(""), text("YES")]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        assert!(t.command.was_called("git push origin prod-2.0.0-rc1"));
    }

    #[test]
    fn test_unknown_environment_fails_immediately() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("staging")]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert_eq!(t.input.prompts().len(), 1);
        assert!(!t.command.was_called("git tag -a"));
    }

    #[test]
    fn test_dev_is_not_taggable() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("dev")]);

        assert_eq!(
            TagCreateCommand::execute(&t.ctx).unwrap(),
            CommandStatus::Failed
        );
    }

    #[test]
    fn test_declined_confirmation_cancels_cleanly() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("qa"), text("1.4.0"), text(""), text("n")]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Cancelled);
        assert_eq!(status.exit_code(), 0);
        assert!(!t.command.was_called("git tag -a"));
        assert!(!t.command.was_called("git push"));
    }

    #[test]
    fn test_dirty_tree_fails_before_any_prompt() {
        let t = TestContext::new().commands(vec![MockCommandResult::ok(
            "git status --porcelain",
            " M src/index.js\n",
        )]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert!(t.input.prompts().is_empty());
    }

    #[test]
    fn test_invalid_version_fails() {
        let t = TestContext::new()
            .commands(clean_repo())
            .answers(vec![text("qa"), text("v1.4")]);

        assert_eq!(
            TagCreateCommand::execute(&t.ctx).unwrap(),
            CommandStatus::Failed
        );
        assert_eq!(t.input.prompts().len(), 2);
    }

    #[test]
    fn test_existing_tag_fails() {
        let t = TestContext::new()
            .commands(vec![
                MockCommandResult::ok("git status --porcelain", ""),
                MockCommandResult::ok("git rev-parse -q --verify refs/tags/qa-1.3.0", "abc\n"),
            ])
            .answers(vec![text("qa"), text("1.3.0")]);

        assert_eq!(
            TagCreateCommand::execute(&t.ctx).unwrap(),
            CommandStatus::Failed
        );
        assert!(
            t.output
                .get_errors()
                .contains(&"Tag qa-1.3.0 already exists".to_string())
        );
    }

    #[test]
    fn test_unknown_commit_fails() {
        let t = TestContext::new()
            .commands(vec![
                MockCommandResult::ok("git status --porcelain", ""),
                MockCommandResult::fail("git rev-parse -q --verify", 1, ""),
                MockCommandResult::fail("git rev-parse --short deadbeef", 128, "unknown revision"),
            ])
            .answers(vec![text("qa"), text("1.4.0"), text("deadbeef")]);

        assert_eq!(
            TagCreateCommand::execute(&t.ctx).unwrap(),
            CommandStatus::Failed
        );
    }

    #[test]
    fn test_explicit_commit_is_tagged() {
        let t = TestContext::new()
            .commands(vec![
                MockCommandResult::ok("git status --porcelain", ""),
                MockCommandResult::fail("git rev-parse -q --verify", 1, ""),
                MockCommandResult::ok("git rev-parse --short a1b2c3d^{commit}", "a1b2c3d\n"),
            ])
            .answers(vec![text("prod"), text("2.1.0"), text("a1b2c3d"), text("y")]);

        TagCreateCommand::execute(&t.ctx).unwrap();

        assert!(t.command.was_called("git tag -a prod-2.1.0 a1b2c3d"));
    }

    #[test]
    fn test_push_failure_reports_git_error() {
        let mut commands = clean_repo();
        commands.push(MockCommandResult::fail(
            "git push origin",
            1,
            "remote: Permission to acme/api.git denied",
        ));
        let t = TestContext::new()
            .commands(commands)
            .answers(vec![text("qa"), text("1.4.0"), text(""), text("y")]);

        let status = TagCreateCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        let errors = t.output.get_errors();
        assert!(errors.iter().any(|e| e.contains("Permission to acme/api.git denied")));
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" Yes "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("sure"));
    }
}
