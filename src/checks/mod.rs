//! Read-only checks run by `edgeops init`.
//!
//! Every checker prints its own findings through `ctx.output` and hands back
//! a plain verdict. Deciding whether a failure stops the run is left to the
//! command.

pub mod auth;
pub mod files;
pub mod prerequisites;
pub mod repository;
pub mod resources;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Outcome of checking one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    /// What was found, e.g. the detected tool version
    pub detected: Option<String>,
    pub status: CheckStatus,
}

impl CheckResult {
    pub fn new(name: &str, detected: Option<String>, status: CheckStatus) -> Self {
        Self {
            name: name.to_string(),
            detected,
            status,
        }
    }
}

/// Combined verdict of a group of checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub warnings: bool,
}

impl Verdict {
    pub fn from_results(results: &[CheckResult]) -> Self {
        Self {
            passed: results.iter().all(|r| r.status != CheckStatus::Fail),
            warnings: results.iter().any(|r| r.status == CheckStatus::Warn),
        }
    }
}
