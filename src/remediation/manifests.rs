use super::render;
use crate::config::ServiceConfig;
use crate::context::Context;
use crate::environment::Environment;
use crate::platform::COMPATIBILITY_DATE;
use anyhow::Result;
use serde::Serialize;

const MANIFEST_TEMPLATE: &str = r#"# Deployment manifest for the {{environment}} environment
name = "{{worker_name}}"
main = "{{entry_point}}"
compatibility_date = "{{compatibility_date}}"
"#;

pub const ENTRY_POINT: &str = "src/index.js";

#[derive(Serialize)]
struct ManifestData<'a> {
    environment: &'a str,
    worker_name: String,
    entry_point: &'a str,
    compatibility_date: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Created,
    /// The file already existed and was left alone
    Skipped,
    Failed(String),
}

pub fn render_manifest(env: Environment, config: &ServiceConfig) -> Result<String> {
    render(
        MANIFEST_TEMPLATE,
        &ManifestData {
            environment: env.as_str(),
            worker_name: env.worker_name(config),
            entry_point: ENTRY_POINT,
            compatibility_date: COMPATIBILITY_DATE,
        },
    )
}

/// Write a manifest for every environment that lacks one.
///
/// Existing files are never touched, so running this twice is harmless.
pub fn generate_manifests(
    ctx: &Context,
    config: &ServiceConfig,
) -> Vec<(Environment, ManifestOutcome)> {
    Environment::ALL
        .iter()
        .map(|env| {
            let file = env.manifest_file();
            let path = ctx.path(&file);

            let outcome = if ctx.fs.exists(&path) {
                ctx.output.dimmed(&format!("{} already exists, skipped", file.display()));
                ManifestOutcome::Skipped
            } else {
                let written =
                    render_manifest(*env, config).and_then(|content| ctx.fs.write(&path, &content));
                match written {
                    Ok(()) => {
                        ctx.output.success(&format!("Created {}", file.display()));
                        ManifestOutcome::Created
                    }
                    Err(e) => {
                        ctx.output.error(&format!("Could not create {}: {:#}", file.display(), e));
                        ManifestOutcome::Failed(format!("{:#}", e))
                    }
                }
            };

            (*env, outcome)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestContext;
    use crate::traits::FileSystem;

    fn config() -> ServiceConfig {
        ServiceConfig {
            service_name: "billing".to_string(),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_render_manifest() {
        let content = render_manifest(Environment::Qa, &config()).unwrap();

        assert!(content.contains("name = \"billing-qa\""));
        assert!(content.contains("main = \"src/index.js\""));
        assert!(content.contains("compatibility_date = \"2024-01-01\""));
    }

    #[test]
    fn test_generates_only_missing_files() {
        let t = TestContext::new().file("wrangler.dev.toml", "name = \"hand-edited\"\n");

        let outcomes = generate_manifests(&t.ctx, &config());

        assert_eq!(
            outcomes,
            vec![
                (Environment::Dev, ManifestOutcome::Skipped),
                (Environment::Qa, ManifestOutcome::Created),
                (Environment::Prod, ManifestOutcome::Created),
            ]
        );
        assert_eq!(
            t.read("wrangler.dev.toml"),
            Some("name = \"hand-edited\"\n".to_string())
        );
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let t = TestContext::new();
        generate_manifests(&t.ctx, &config());
        let first = t.fs.list_files();

        // Edit a generated file between runs
        t.fs
            .write(&t.path("wrangler.qa.toml"), "name = \"custom\"\n")
            .unwrap();
        let outcomes = generate_manifests(&t.ctx, &config());

        assert!(outcomes.iter().all(|(_, o)| *o == ManifestOutcome::Skipped));
        assert_eq!(t.fs.list_files(), first);
        assert_eq!(t.read("wrangler.qa.toml"), Some("name = \"custom\"\n".to_string()));
    }

    #[test]
    fn test_one_failure_does_not_stop_the_others() {
        let t = TestContext::new();
        t.fs.deny_writes(t.path("wrangler.qa.toml"));

        let outcomes = generate_manifests(&t.ctx, &config());

        assert_eq!(outcomes[0].1, ManifestOutcome::Created);
        assert!(matches!(outcomes[1].1, ManifestOutcome::Failed(_)));
        assert_eq!(outcomes[2].1, ManifestOutcome::Created);
    }
}
