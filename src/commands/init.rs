//! `edgeops init`: validate the working tree and the platform account.
//!
//! Checks run top to bottom. Missing tools, an unreachable remote and
//! failed authentication stop the run immediately; missing files and
//! scripts are reported after every check has had its say. Along the way
//! the operator is offered fixes for manifests, workflow placeholders and
//! absent workers.

use super::CommandStatus;
use crate::checks::Verdict;
use crate::checks::auth::check_auth;
use crate::checks::files::{
    check_config_file, check_required_files, check_scripts, missing_manifests, required_files,
};
use crate::checks::prerequisites::check_prerequisites;
use crate::checks::repository::check_remote;
use crate::checks::resources::check_resources;
use crate::config::{CONFIG_FILE, ConfigSource, ServiceConfig};
use crate::context::Context;
use crate::environment::Environment;
use crate::remediation::manifests::generate_manifests;
use crate::remediation::provision::provision_workers;
use crate::remediation::workflows::{WorkflowOutcome, needs_rewrite, rewrite_workflows};
use anyhow::Result;
use tracing::debug;

pub struct InitCommand;

impl InitCommand {
    pub fn execute(ctx: &Context) -> Result<CommandStatus> {
        ctx.output.section("Environment Validation");

        let config = ServiceConfig::resolve(ctx)?;
        Self::print_config(ctx, &config);

        let prerequisites = Verdict::from_results(&check_prerequisites(ctx)?);
        if !prerequisites.passed {
            ctx.output.blank();
            ctx.output.error("Install the missing tools and run init again");
            return Ok(CommandStatus::Failed);
        }
        let mut warnings = prerequisites.warnings;

        if check_remote(ctx)?.is_err() {
            return Ok(CommandStatus::Failed);
        }

        if check_auth(ctx)?.is_none() {
            return Ok(CommandStatus::Failed);
        }

        let files_ok = Self::files(ctx, &config)?;
        warnings |= !Self::workflows(ctx, &config)?;
        warnings |= !Self::resources(ctx, &config)?;

        let scripts = Verdict::from_results(&check_scripts(ctx)?);
        warnings |= scripts.warnings;

        ctx.output.blank();
        if !files_ok || !scripts.passed {
            ctx.output.error("Environment is not ready for deployment");
            ctx.output.info("Fix the errors above and run init again");
            return Ok(CommandStatus::Failed);
        }

        if warnings {
            ctx.output.warning("Environment is usable, but review the warnings above");
        } else {
            ctx.output.success("Environment is ready for deployment");
        }

        ctx.output.next_steps(&[
            "Push to main to deploy the dev environment".to_string(),
            "Run `npm run tag:create` to release to qa or prod".to_string(),
            "Run `npm run tag:status` to see what each environment is running".to_string(),
        ]);

        Ok(if warnings {
            CommandStatus::CompletedWithWarnings
        } else {
            CommandStatus::Completed
        })
    }

    fn print_config(ctx: &Context, config: &ServiceConfig) {
        ctx.output.subsection("Configuration");
        ctx.output.key_value(
            "Service",
            &format!("{} ({})", config.service_name, source_label(config.sources.service_name)),
        );
        ctx.output.key_value(
            "Domain",
            &format!("{} ({})", config.workers_domain, source_label(config.sources.workers_domain)),
        );
        ctx.output.key_value(
            "Account",
            &format!("{} ({})", config.account_id, source_label(config.sources.account_id)),
        );
        ctx.output.key_value("Production worker", &Environment::Prod.worker_name(config));
    }

    /// Required files, offering to generate missing manifests.
    /// Returns whether every required file exists afterwards.
    fn files(ctx: &Context, config: &ServiceConfig) -> Result<bool> {
        check_config_file(ctx, config);

        if Verdict::from_results(&check_required_files(ctx)).passed {
            return Ok(true);
        }

        let missing = missing_manifests(ctx);
        if !missing.is_empty() {
            if config.has_configured_service() {
                let names: Vec<_> = missing.iter().map(Environment::as_str).collect();
                let prompt = format!(
                    "Create the missing deployment manifests ({})?",
                    names.join(", ")
                );
                if ctx.input.confirm(&prompt, true)? {
                    generate_manifests(ctx, config);
                }
            } else {
                ctx.output.info(&format!(
                    "Set serviceName in {} to have init generate the deployment manifests",
                    CONFIG_FILE
                ));
            }
        }

        let present = required_files()
            .iter()
            .all(|file| ctx.fs.is_file(&ctx.path(file)));
        debug!(present, "required files after remediation");
        Ok(present)
    }

    /// Offer to replace placeholders in the CI workflows.
    /// Returns false when a placeholder is left behind.
    fn workflows(ctx: &Context, config: &ServiceConfig) -> Result<bool> {
        if !needs_rewrite(ctx) {
            return Ok(true);
        }

        ctx.output.subsection("Workflows");

        if !config.has_configured_domain() {
            ctx.output.warning("CI workflows still contain placeholder names");
            ctx.output.info(&format!(
                "Set serviceName and workersDomain in {} to have init update them",
                CONFIG_FILE
            ));
            return Ok(false);
        }

        if !ctx
            .input
            .confirm("Replace the placeholders in the CI workflow files?", true)?
        {
            ctx.output.warning("CI workflows still contain placeholder names");
            return Ok(false);
        }

        let outcomes = rewrite_workflows(ctx, config);
        Ok(outcomes
            .iter()
            .all(|(_, outcome)| !matches!(outcome, WorkflowOutcome::Failed(_))))
    }

    /// Worker existence, offering to provision when none exist yet.
    /// Returns whether every environment ends up with a worker.
    fn resources(ctx: &Context, config: &ServiceConfig) -> Result<bool> {
        let Some(report) = check_resources(ctx, config)? else {
            return Ok(false);
        };

        if report.all_present() {
            ctx.output.success("All environments have a worker");
            return Ok(true);
        }

        if !report.none_present() {
            ctx.output.warning("Some workers are missing; they are created by their first deploy");
            return Ok(false);
        }

        if !config.is_complete() {
            ctx.output.info(&format!(
                "Set serviceName and accountId in {} to have init create the workers",
                CONFIG_FILE
            ));
            return Ok(false);
        }

        if !ctx
            .input
            .confirm("No workers exist yet. Create placeholder workers now?", true)?
        {
            return Ok(false);
        }

        let summary = provision_workers(ctx, config, &Environment::ALL);
        if summary.failed.is_empty() {
            ctx.output.success("All environments have a worker");
            Ok(true)
        } else {
            ctx.output.warning(&format!(
                "{} of {} workers could not be created",
                summary.failed.len(),
                Environment::ALL.len()
            ));
            Ok(false)
        }
    }
}

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::ConfigFile => "from worker-config.json",
        ConfigSource::PackageManifest => "from package.json",
        ConfigSource::EnvVar => "from environment",
        ConfigSource::Placeholder => "placeholder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ACCOUNT_ID_VAR, API_TOKEN_VAR};
    use crate::test_helpers::{TestContext, confirm};
    use crate::traits::MockCommandResult;

    const CONFIG: &str =
        r#"{"serviceName":"billing","workersDomain":"acme.workers.dev","accountId":"a1b2"}"#;
    const PACKAGE: &str = r#"{
  "name": "billing",
  "scripts": {
    "init": "edgeops init",
    "tag:create": "edgeops tag create",
    "tag:status": "edgeops tag status"
  }
}"#;

    fn healthy_commands(listing: &str) -> Vec<MockCommandResult> {
        vec![
            MockCommandResult::ok("git --version", "git version 2.43.0\n"),
            MockCommandResult::ok("npm --version", "10.2.4\n"),
            MockCommandResult::ok("node --version", "v20.11.1\n"),
            MockCommandResult::ok("npx wrangler --version", "3.57.1\n"),
            MockCommandResult::ok("git remote get-url origin", "git@github.com:acme/billing.git\n"),
            MockCommandResult::ok("npx wrangler deployments list", listing),
        ]
    }

    fn project() -> TestContext {
        TestContext::new()
            .file("worker-config.json", CONFIG)
            .file("package.json", PACKAGE)
            .file("wrangler.dev.toml", "")
            .file("wrangler.qa.toml", "")
            .file("wrangler.prod.toml", "")
            .env(API_TOKEN_VAR, "token")
            .env(ACCOUNT_ID_VAR, "a1b2")
    }

    #[test]
    fn test_ready_project_completes() {
        let t = project().commands(healthy_commands("billing-dev\nbilling-qa\nbilling-prod\n"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        assert!(!t.output.has_error());
        assert!(t.input.prompts().is_empty());
        assert!(!t.command.was_called("npx wrangler whoami"));
    }

    #[test]
    fn test_missing_tool_stops_before_repository_check() {
        let mut commands = healthy_commands("");
        commands[0] = MockCommandResult::missing("git --version");
        let t = project().commands(commands);

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert!(!t.command.was_called("git remote"));
    }

    #[test]
    fn test_failed_authentication_is_fatal() {
        let t = TestContext::new()
            .file("worker-config.json", CONFIG)
            .commands(vec![
                MockCommandResult::ok("git --version", "git version 2.43.0\n"),
                MockCommandResult::ok("npm --version", "10.2.4\n"),
                MockCommandResult::ok("node --version", "v20.11.1\n"),
                MockCommandResult::ok("npx wrangler --version", "3.57.1\n"),
                MockCommandResult::ok("git remote get-url origin", "git@github.com:acme/api.git\n"),
                MockCommandResult::ok("npx wrangler whoami", "You are not authenticated."),
            ]);

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert!(!t.command.was_called("npx wrangler deployments"));
    }

    #[test]
    fn test_generates_missing_manifests_when_accepted() {
        let t = TestContext::new()
            .file("worker-config.json", CONFIG)
            .file("package.json", PACKAGE)
            .file("wrangler.dev.toml", "")
            .env(API_TOKEN_VAR, "token")
            .env(ACCOUNT_ID_VAR, "a1b2")
            .answers(vec![confirm(true)])
            .commands(healthy_commands("billing-dev billing-qa billing-prod"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        assert!(t.read("wrangler.qa.toml").unwrap().contains("billing-qa"));
        assert_eq!(t.read("wrangler.dev.toml").unwrap(), "");
    }

    #[test]
    fn test_declined_manifests_fail_the_run() {
        let t = TestContext::new()
            .file("worker-config.json", CONFIG)
            .file("package.json", PACKAGE)
            .env(API_TOKEN_VAR, "token")
            .env(ACCOUNT_ID_VAR, "a1b2")
            .answers(vec![confirm(false)])
            .commands(healthy_commands("billing-dev billing-qa billing-prod"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert!(t.read("wrangler.prod.toml").is_none());
    }

    #[test]
    fn test_provisions_workers_when_none_exist() {
        let t = project()
            .answers(vec![confirm(true)])
            .commands(healthy_commands("No deployments found\n"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        let deploys = t
            .command
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("npx wrangler deploy "))
            .count();
        assert_eq!(deploys, 3);
    }

    #[test]
    fn test_partial_workers_only_warn() {
        let t = project().commands(healthy_commands("billing-dev\n"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::CompletedWithWarnings);
        assert!(!t.command.was_called("npx wrangler deploy "));
    }

    #[test]
    fn test_rewrites_workflow_placeholders_when_accepted() {
        let t = project()
            .file(
                ".github/workflows/deploy-dev.yml",
                "env:\n  WORKER_URL: https://my-service-dev.your-subdomain.workers.dev\n",
            )
            .answers(vec![confirm(true)])
            .commands(healthy_commands("billing-dev billing-qa billing-prod"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Completed);
        assert!(
            t.read(".github/workflows/deploy-dev.yml")
                .unwrap()
                .contains("https://billing-dev.acme.workers.dev")
        );
    }

    #[test]
    fn test_missing_required_script_fails() {
        let t = project()
            .file("package.json", r#"{"name":"billing","scripts":{"init":"edgeops init"}}"#)
            .commands(healthy_commands("billing-dev billing-qa billing-prod"));

        let status = InitCommand::execute(&t.ctx).unwrap();

        assert_eq!(status, CommandStatus::Failed);
        assert_eq!(status.exit_code(), 1);
    }
}
