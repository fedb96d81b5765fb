use super::{CheckResult, CheckStatus};
use crate::config::{CONFIG_FILE, PACKAGE_MANIFEST, PackageManifest, ServiceConfig};
use crate::context::Context;
use crate::environment::Environment;
use anyhow::Result;
use std::path::PathBuf;

/// Scripts `package.json` must expose
pub const REQUIRED_SCRIPTS: &[&str] = &["tag:create", "tag:status"];

/// Scripts `package.json` should expose
pub const RECOMMENDED_SCRIPTS: &[&str] = &["init"];

/// Files that must exist before deploying, relative to the working tree
pub fn required_files() -> Vec<PathBuf> {
    Environment::ALL
        .iter()
        .map(Environment::manifest_file)
        .chain(std::iter::once(PathBuf::from(PACKAGE_MANIFEST)))
        .collect()
}

/// Deployment manifests that don't exist yet
pub fn missing_manifests(ctx: &Context) -> Vec<Environment> {
    Environment::ALL
        .iter()
        .copied()
        .filter(|env| !ctx.fs.is_file(&ctx.path(env.manifest_file())))
        .collect()
}

/// Check every required file is present
pub fn check_required_files(ctx: &Context) -> Vec<CheckResult> {
    ctx.output.subsection("Files");

    required_files()
        .iter()
        .map(|file| {
            let name = file.display().to_string();
            if ctx.fs.is_file(&ctx.path(file)) {
                ctx.output.success(&format!("{} found", name));
                CheckResult::new(&name, None, CheckStatus::Pass)
            } else {
                ctx.output.error(&format!("{} is missing", name));
                CheckResult::new(&name, None, CheckStatus::Fail)
            }
        })
        .collect()
}

/// Report on the optional `worker-config.json`. Never a failure.
pub fn check_config_file(ctx: &Context, config: &ServiceConfig) {
    if config.config_file_present {
        ctx.output.success(&format!("{} found", CONFIG_FILE));
    } else {
        ctx.output.info(&format!(
            "{} not found, using defaults (service name: {})",
            CONFIG_FILE, config.service_name
        ));
    }
}

/// Check the named scripts in `package.json`
pub fn check_scripts(ctx: &Context) -> Result<Vec<CheckResult>> {
    ctx.output.subsection("Scripts");

    let Some(manifest) = PackageManifest::load(ctx)? else {
        ctx.output.error(&format!("Cannot check scripts: {} is missing", PACKAGE_MANIFEST));
        return Ok(vec![CheckResult::new(PACKAGE_MANIFEST, None, CheckStatus::Fail)]);
    };

    let required = REQUIRED_SCRIPTS.iter().map(|s| (*s, CheckStatus::Fail));
    let recommended = RECOMMENDED_SCRIPTS.iter().map(|s| (*s, CheckStatus::Warn));

    let results = required
        .chain(recommended)
        .map(|(script, missing_status)| {
            if manifest.has_script(script) {
                ctx.output.success(&format!("script \"{}\" defined", script));
                let command = manifest.scripts.get(script).cloned();
                return CheckResult::new(script, command, CheckStatus::Pass);
            }

            match missing_status {
                CheckStatus::Fail => ctx.output.error(&format!(
                    "script \"{}\" is missing from {}",
                    script, PACKAGE_MANIFEST
                )),
                _ => ctx.output.warning(&format!(
                    "script \"{}\" is recommended in {}",
                    script, PACKAGE_MANIFEST
                )),
            }
            CheckResult::new(script, None, missing_status)
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Verdict;
    use crate::test_helpers::TestContext;

    #[test]
    fn test_required_files_listing() {
        let files = required_files();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&PathBuf::from("wrangler.qa.toml")));
        assert!(files.contains(&PathBuf::from("package.json")));
    }

    #[test]
    fn test_missing_manifest_fails() {
        let t = TestContext::new()
            .file("wrangler.dev.toml", "")
            .file("wrangler.qa.toml", "")
            .file("package.json", "{}");

        let results = check_required_files(&t.ctx);

        assert!(!Verdict::from_results(&results).passed);
        assert_eq!(missing_manifests(&t.ctx), vec![Environment::Prod]);
        assert!(
            t.output
                .get_errors()
                .contains(&"wrangler.prod.toml is missing".to_string())
        );
    }

    #[test]
    fn test_absent_config_file_is_informational() {
        let t = TestContext::new();

        check_config_file(&t.ctx, &ServiceConfig::default());

        assert!(!t.output.has_error());
        assert!(t.output.get_warnings().is_empty());
    }

    #[test]
    fn test_missing_recommended_script_only_warns() {
        let t = TestContext::new().file(
            "package.json",
            r#"{"scripts":{"tag:create":"edgeops tag create","tag:status":"edgeops tag status"}}"#,
        );

        let results = check_scripts(&t.ctx).unwrap();
        let verdict = Verdict::from_results(&results);

        assert!(verdict.passed);
        assert!(verdict.warnings);
    }

    #[test]
    fn test_missing_required_script_fails() {
        let t = TestContext::new().file("package.json", r#"{"scripts":{"init":"edgeops init"}}"#);

        let results = check_scripts(&t.ctx).unwrap();

        assert!(!Verdict::from_results(&results).passed);
        assert_eq!(t.output.get_errors().len(), 2);
    }

    #[test]
    fn test_scripts_check_fails_without_manifest() {
        let t = TestContext::new();

        let results = check_scripts(&t.ctx).unwrap();

        assert_eq!(results[0].status, CheckStatus::Fail);
    }
}
