//! Version strings and deployment tags.

use crate::environment::Environment;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    static ref RELEASE_VERSION: Regex =
        Regex::new(r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.+-]+)?$").unwrap();
    static ref DOTTED_NUMBER: Regex = Regex::new(r"\d+(?:\.\d+)+").unwrap();
}

/// Compare two dotted-numeric versions segment by segment.
///
/// Missing trailing segments count as zero, so `1.2` equals `1.2.0`. Each
/// segment is read by its leading digits; a segment without any is zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<u64> = a.split('.').map(segment_value).collect();
    let right: Vec<u64> = b.split('.').map(segment_value).collect();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

fn segment_value(segment: &str) -> u64 {
    let digits: String = segment
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    // Only overflow can fail here
    digits.parse().unwrap_or(u64::MAX)
}

/// First dotted number in a tool's version banner (`git version 2.43.0` → `2.43.0`)
pub fn extract_version(banner: &str) -> Option<String> {
    DOTTED_NUMBER.find(banner).map(|m| m.as_str().to_string())
}

/// Whether `version` is acceptable as the version part of a deployment tag
pub fn is_release_version(version: &str) -> bool {
    RELEASE_VERSION.is_match(version)
}

/// A deployment tag: `<environment>-<version>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTag {
    pub environment: Environment,
    pub version: String,
}

impl VersionTag {
    pub fn new(environment: Environment, version: &str) -> Result<Self> {
        let version = version.trim();
        if !is_release_version(version) {
            anyhow::bail!(
                "Invalid version '{}': expected MAJOR.MINOR.PATCH, optionally followed by -prerelease or +build",
                version
            );
        }

        Ok(Self {
            environment,
            version: version.to_string(),
        })
    }

    /// Recover environment and version from a tag name
    pub fn parse(name: &str) -> Result<Self> {
        let (env, version) = name
            .split_once('-')
            .with_context(|| format!("Tag '{}' is not of the form <env>-<version>", name))?;
        let environment = Environment::parse(env)?;
        Self::new(environment, version)
    }

    pub fn name(&self) -> String {
        format!("{}-{}", self.environment, self.version)
    }

    /// Message attached to the annotated tag
    pub fn annotation(&self) -> String {
        format!("Deploy to {} - version {}", self.environment, self.version)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
