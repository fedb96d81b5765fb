//! Service configuration resolution.
//!
//! Every command resolves the configuration once, at start-up, and passes it
//! down. Each field falls back independently:
//!
//! - `serviceName`: `worker-config.json` → `package.json` `name` → placeholder
//! - `accountId`: `worker-config.json` → `CLOUDFLARE_ACCOUNT_ID` → placeholder
//! - `workersDomain`: `worker-config.json` → placeholder

use crate::context::Context;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_FILE: &str = "worker-config.json";
pub const PACKAGE_MANIFEST: &str = "package.json";

pub const PLACEHOLDER_SERVICE_NAME: &str = "my-service";
pub const PLACEHOLDER_DOMAIN: &str = "your-subdomain.workers.dev";
pub const PLACEHOLDER_ACCOUNT_ID: &str = "your-account-id";

pub const ACCOUNT_ID_VAR: &str = "CLOUDFLARE_ACCOUNT_ID";
pub const API_TOKEN_VAR: &str = "CLOUDFLARE_API_TOKEN";

/// Contents of `worker-config.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfigFile {
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub workers_domain: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    /// Deploy prod under the bare service name instead of `<service>-prod`
    #[serde(default)]
    pub clean_prod_name: Option<bool>,
}

/// The parts of `package.json` this tool reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn load(ctx: &Context) -> Result<Option<Self>> {
        read_json(ctx, &ctx.path(PACKAGE_MANIFEST))
    }

    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }
}

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigSource {
    ConfigFile,
    PackageManifest,
    EnvVar,
    #[default]
    Placeholder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSources {
    pub service_name: ConfigSource,
    pub workers_domain: ConfigSource,
    pub account_id: ConfigSource,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub service_name: String,
    pub workers_domain: String,
    pub account_id: String,
    pub clean_prod_name: bool,
    pub sources: ConfigSources,
    pub config_file_present: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: PLACEHOLDER_SERVICE_NAME.to_string(),
            workers_domain: PLACEHOLDER_DOMAIN.to_string(),
            account_id: PLACEHOLDER_ACCOUNT_ID.to_string(),
            clean_prod_name: false,
            sources: ConfigSources::default(),
            config_file_present: false,
        }
    }
}

impl ServiceConfig {
    /// Resolve the configuration for the working tree in `ctx`
    pub fn resolve(ctx: &Context) -> Result<Self> {
        let file: Option<WorkerConfigFile> = read_json(ctx, &ctx.path(CONFIG_FILE))?;
        let manifest = PackageManifest::load(ctx)?;
        let mut config = ServiceConfig {
            config_file_present: file.is_some(),
            ..ServiceConfig::default()
        };
        let file = file.unwrap_or_default();

        if let Some(name) = non_empty(file.service_name) {
            config.service_name = name;
            config.sources.service_name = ConfigSource::ConfigFile;
        } else if let Some(name) = non_empty(manifest.and_then(|m| m.name)) {
            config.service_name = name;
            config.sources.service_name = ConfigSource::PackageManifest;
        }

        if let Some(domain) = non_empty(file.workers_domain) {
            config.workers_domain = domain;
            config.sources.workers_domain = ConfigSource::ConfigFile;
        }

        if let Some(account) = non_empty(file.account_id) {
            config.account_id = account;
            config.sources.account_id = ConfigSource::ConfigFile;
        } else if let Some(account) = ctx.env.var(ACCOUNT_ID_VAR) {
            config.account_id = account;
            config.sources.account_id = ConfigSource::EnvVar;
        }

        config.clean_prod_name = file.clean_prod_name.unwrap_or(false);

        tracing::debug!(?config, "resolved service configuration");
        Ok(config)
    }

    /// The config file names a service
    pub fn has_configured_service(&self) -> bool {
        self.sources.service_name == ConfigSource::ConfigFile
    }

    /// The config file names a service and a real domain
    pub fn has_configured_domain(&self) -> bool {
        self.has_configured_service()
            && self.sources.workers_domain == ConfigSource::ConfigFile
            && self.workers_domain != PLACEHOLDER_DOMAIN
    }

    /// Service name and account id are both real values, enough to provision workers
    pub fn is_complete(&self) -> bool {
        self.sources.service_name != ConfigSource::Placeholder
            && self.service_name != PLACEHOLDER_SERVICE_NAME
            && self.sources.account_id != ConfigSource::Placeholder
            && self.account_id != PLACEHOLDER_ACCOUNT_ID
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a JSON file if it exists. Absence is `None`; malformed content is an error.
fn read_json<T: serde::de::DeserializeOwned>(ctx: &Context, path: &Path) -> Result<Option<T>> {
    if !ctx.fs.is_file(path) {
        return Ok(None);
    }

    let content = ctx.fs.read_to_string(path)?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestContext;

    #[test]
    fn test_config_file_wins() {
        let t = TestContext::new()
            .file(
                CONFIG_FILE,
                r#"{"serviceName":"billing","workersDomain":"acme.workers.dev","accountId":"a1b2"}"#,
            )
            .file(PACKAGE_MANIFEST, r#"{"name":"billing-pkg"}"#);

        let config = ServiceConfig::resolve(&t.ctx).unwrap();

        assert_eq!(config.service_name, "billing");
        assert_eq!(config.workers_domain, "acme.workers.dev");
        assert_eq!(config.account_id, "a1b2");
        assert!(config.config_file_present);
        assert!(config.has_configured_domain());
        assert!(config.is_complete());
    }

    #[test]
    fn test_falls_back_to_package_name_then_placeholders() {
        let t = TestContext::new().file(PACKAGE_MANIFEST, r#"{"name":"from-package"}"#);

        let config = ServiceConfig::resolve(&t.ctx).unwrap();

        assert_eq!(config.service_name, "from-package");
        assert_eq!(config.sources.service_name, ConfigSource::PackageManifest);
        assert_eq!(config.workers_domain, PLACEHOLDER_DOMAIN);
        assert_eq!(config.account_id, PLACEHOLDER_ACCOUNT_ID);
        assert!(!config.config_file_present);
        assert!(!config.is_complete());
    }

    #[test]
    fn test_placeholder_service_name_without_any_file() {
        let t = TestContext::new();

        let config = ServiceConfig::resolve(&t.ctx).unwrap();

        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_account_id_from_environment() {
        let t = TestContext::new()
            .file(CONFIG_FILE, r#"{"serviceName":"billing"}"#)
            .env(ACCOUNT_ID_VAR, "env-account");

        let config = ServiceConfig::resolve(&t.ctx).unwrap();

        assert_eq!(config.account_id, "env-account");
        assert_eq!(config.sources.account_id, ConfigSource::EnvVar);
        assert!(config.is_complete());
        assert!(!config.has_configured_domain());
    }

    #[test]
    fn test_blank_values_fall_through() {
        let t = TestContext::new()
            .file(CONFIG_FILE, r#"{"serviceName":"  ","workersDomain":""}"#)
            .file(PACKAGE_MANIFEST, r#"{"name":"pkg"}"#);

        let config = ServiceConfig::resolve(&t.ctx).unwrap();

        assert_eq!(config.service_name, "pkg");
        assert_eq!(config.workers_domain, PLACEHOLDER_DOMAIN);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let t = TestContext::new().file(CONFIG_FILE, "{ not json");

        let err = ServiceConfig::resolve(&t.ctx).unwrap_err();

        assert!(err.to_string().contains("worker-config.json"));
    }

    #[test]
    fn test_package_scripts() {
        let t = TestContext::new().file(
            PACKAGE_MANIFEST,
            r#"{"name":"x","scripts":{"tag:create":"edgeops tag create"}}"#,
        );

        let manifest = PackageManifest::load(&t.ctx).unwrap().unwrap();

        assert!(manifest.has_script("tag:create"));
        assert!(!manifest.has_script("tag:status"));
    }
}
