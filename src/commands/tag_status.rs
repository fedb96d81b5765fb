//! `edgeops tag status`: what each environment is believed to run.
//!
//! Read-only. Missing tags and git errors are reported in place and the
//! command always completes.

use super::CommandStatus;
use crate::config::ServiceConfig;
use crate::context::Context;
use crate::environment::Environment;
use crate::git::{CommitInfo, Git, MAIN_BRANCH};
use crate::version::VersionTag;
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};

pub struct TagStatusCommand;

impl TagStatusCommand {
    pub fn execute(ctx: &Context) -> Result<CommandStatus> {
        ctx.output.section("Deployment Status");

        let config = ServiceConfig::resolve(ctx).unwrap_or_else(|e| {
            ctx.output.warning(&format!("{:#}; falling back to default names", e));
            ServiceConfig::default()
        });
        let git = Git::new(ctx);
        let now = Utc::now();

        for env in Environment::ALL {
            ctx.output.subsection(&env.as_str().to_uppercase());
            ctx.output.key_value("Worker", &env.worker_name(&config));
            ctx.output.key_value_highlight("URL", &env.url(&config));

            if env.is_taggable() {
                Self::report_tagged(ctx, &git, env, now);
            } else {
                Self::report_branch(ctx, &git, now);
            }
        }

        Ok(CommandStatus::Completed)
    }

    /// dev follows the main branch
    fn report_branch(ctx: &Context, git: &Git, now: DateTime<Utc>) {
        ctx.output.key_value("Source", &format!("{} branch (continuous)", MAIN_BRANCH));
        match git.last_commit(MAIN_BRANCH) {
            Ok(commit) => Self::print_commit(ctx, &commit, now),
            Err(e) => ctx.output.warning(&format!("Could not read {}: {:#}", MAIN_BRANCH, e)),
        }
    }

    fn report_tagged(ctx: &Context, git: &Git, env: Environment, now: DateTime<Utc>) {
        let tag = match git.latest_tag(env) {
            Ok(Some(tag)) => tag,
            Ok(None) => {
                ctx.output.info(&format!("No tags found for {}", env));
                return;
            }
            Err(e) => {
                ctx.output.warning(&format!("Could not list {} tags: {:#}", env, e));
                return;
            }
        };

        ctx.output.key_value("Tag", &tag);
        if let Ok(parsed) = VersionTag::parse(&tag) {
            ctx.output.key_value("Version", &parsed.version);
        }

        match git.last_commit(&tag) {
            Ok(commit) => {
                ctx.output.key_value("Commit", &commit.short_hash);
                ctx.output.key_value("Author", &commit.author);
                ctx.output.key_value("Date", &Self::format_date(commit.date, now));
            }
            Err(e) => ctx.output.warning(&format!("Could not read commit for {}: {:#}", tag, e)),
        }

        if let Ok(Some(subject)) = git.tag_subject(&tag) {
            ctx.output.key_value("Message", &subject);
        }
    }

    fn print_commit(ctx: &Context, commit: &CommitInfo, now: DateTime<Utc>) {
        ctx.output.key_value("Commit", &commit.short_hash);
        ctx.output.key_value("Author", &commit.author);
        ctx.output.key_value("Date", &Self::format_date(commit.date, now));
        ctx.output.key_value("Message", &commit.subject);
    }

    fn format_date(date: Option<DateTime<FixedOffset>>, now: DateTime<Utc>) -> String {
        match date {
            Some(date) => format!(
                "{} ({})",
                date.format("%Y-%m-%d %H:%M"),
                describe_age(date, now)
            ),
            None => "unknown".to_string(),
        }
    }
}

/// Rough age of `date` relative to `now`, e.g. "3 days ago"
pub fn describe_age(date: DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(date.with_timezone(&Utc));

    let (amount, unit) = if elapsed.num_minutes() < 1 {
        return "just now".to_string();
    } else if elapsed.num_hours() < 1 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_days(), "day")
    };

    let plural = if amount == 1 { "" } else { "s" };
    format!("{} {}{} ago", amount, unit, plural)
}
