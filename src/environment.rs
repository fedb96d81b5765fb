use crate::config::ServiceConfig;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// A named deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Dev,
    Qa,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Qa, Environment::Prod];

    /// Environments deployed by pushing a tag; dev deploys from `main`
    pub const TAGGABLE: [Environment; 2] = [Environment::Qa, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prod => "prod",
        }
    }

    /// Parse an environment name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "qa" => Ok(Environment::Qa),
            "prod" => Ok(Environment::Prod),
            other => anyhow::bail!("Unknown environment: '{}' (expected dev, qa or prod)", other),
        }
    }

    pub fn is_taggable(&self) -> bool {
        Self::TAGGABLE.contains(self)
    }

    /// Name of the worker deployed for this environment
    pub fn worker_name(&self, config: &ServiceConfig) -> String {
        match self {
            Environment::Prod if config.clean_prod_name => config.service_name.clone(),
            _ => format!("{}-{}", config.service_name, self.as_str()),
        }
    }

    /// Public URL the worker is served from
    pub fn url(&self, config: &ServiceConfig) -> String {
        format!("https://{}.{}", self.worker_name(config), config.workers_domain)
    }

    /// Deployment manifest, relative to the working tree
    pub fn manifest_file(&self) -> PathBuf {
        PathBuf::from(format!("wrangler.{}.toml", self.as_str()))
    }

    /// CI workflow that deploys this environment, relative to the working tree
    pub fn workflow_file(&self) -> PathBuf {
        PathBuf::from(".github/workflows").join(format!("deploy-{}.yml", self.as_str()))
    }

    /// Glob matching this environment's deployment tags
    pub fn tag_pattern(&self) -> String {
        format!("{}-*", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
