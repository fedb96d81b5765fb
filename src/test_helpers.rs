//! Test helpers for building a `Context` backed by mocks
//!
//! `TestContext` keeps typed handles to every mock so tests can script
//! prompts and command results up front and inspect calls, files and
//! output afterwards.

#![cfg(test)]

use crate::context::Context;
use crate::traits::{
    FileSystem, MockCommandExecutor, MockCommandResult, MockEnvVars, MockFileSystem, MockOutput,
    MockResponse, MockUserInput,
};
use std::path::PathBuf;
use std::sync::Arc;

pub const TEST_ROOT: &str = "/work";

/// Builder for a mock-backed context rooted at `/work`
pub struct TestContext {
    pub ctx: Context,
    pub fs: Arc<MockFileSystem>,
    pub input: Arc<MockUserInput>,
    pub output: Arc<MockOutput>,
    pub command: Arc<MockCommandExecutor>,
    vars: Vec<(String, String)>,
}

impl TestContext {
    pub fn new() -> Self {
        let fs = Arc::new(MockFileSystem::new());
        let input = Arc::new(MockUserInput::new());
        let output = Arc::new(MockOutput::new());
        let command = Arc::new(MockCommandExecutor::new());

        let ctx = Context {
            fs: fs.clone(),
            input: input.clone(),
            output: output.clone(),
            command: command.clone(),
            env: Arc::new(MockEnvVars::new()),
            root: PathBuf::from(TEST_ROOT),
        };

        Self {
            ctx,
            fs,
            input,
            output,
            command,
            vars: Vec::new(),
        }
    }

    /// Seed a file relative to the working tree
    pub fn file(self, relative: &str, contents: &str) -> Self {
        self.fs
            .write(&self.ctx.path(relative), contents)
            .unwrap();
        self
    }

    /// Set an environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.vars.push((key.to_string(), value.to_string()));
        let vars = self
            .vars
            .iter()
            .fold(MockEnvVars::new(), |vars, (k, v)| vars.with(k, v));
        self.ctx.env = Arc::new(vars);
        self
    }

    /// Queue prompt answers, in order
    pub fn answers(self, responses: Vec<MockResponse>) -> Self {
        for response in responses {
            self.input.add_response(response);
        }
        self
    }

    /// Queue command results
    pub fn commands(self, results: Vec<MockCommandResult>) -> Self {
        for result in results {
            self.command.add_output(result);
        }
        self
    }

    /// Absolute path of `relative` inside the working tree
    pub fn path(&self, relative: &str) -> PathBuf {
        self.ctx.path(relative)
    }

    /// Contents of a file relative to the working tree
    pub fn read(&self, relative: &str) -> Option<String> {
        self.fs.get_file_contents(&self.ctx.path(relative))
    }
}

/// Shorthand for a scripted text answer
pub fn text(answer: &str) -> MockResponse {
    MockResponse::Text(answer.to_string())
}

/// Shorthand for a scripted yes/no answer
pub fn confirm(answer: bool) -> MockResponse {
    MockResponse::Confirm(answer)
}
