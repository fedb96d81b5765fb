use std::collections::HashMap;

/// Trait for reading process environment variables, allowing for mocking in tests
pub trait EnvVars: Send + Sync {
    /// Value of `key`, or `None` when unset or empty
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment
pub struct ProcessEnvVars;

impl EnvVars for ProcessEnvVars {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed set of variables for tests
#[allow(dead_code)]
pub struct MockEnvVars {
    vars: HashMap<String, String>,
}

#[allow(dead_code)]
impl MockEnvVars {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Default for MockEnvVars {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvVars for MockEnvVars {
    fn var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}
