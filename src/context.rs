use crate::traits::{
    CommandExecutor, EnvVars, FileSystem, InquireUserInput, Output, ProcessEnvVars,
    RealCommandExecutor, RealFileSystem, TerminalOutput, UserInput,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context that holds all dependencies for dependency injection
pub struct Context {
    pub fs: Arc<dyn FileSystem>,
    pub input: Arc<dyn UserInput>,
    pub output: Arc<dyn Output>,
    pub command: Arc<dyn CommandExecutor>,
    pub env: Arc<dyn EnvVars>,
    /// Working tree every command operates on
    pub root: PathBuf,
}

impl Context {
    /// Create a new context with real implementations (for production use)
    pub fn new(root: PathBuf) -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            input: Arc::new(InquireUserInput),
            output: Arc::new(TerminalOutput),
            command: Arc::new(RealCommandExecutor::new()),
            env: Arc::new(ProcessEnvVars),
            root,
        }
    }

    /// Path of `relative` inside the working tree
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}

impl Clone for Context {
    fn clone(&self) -> Self {
        Self {
            fs: Arc::clone(&self.fs),
            input: Arc::clone(&self.input),
            output: Arc::clone(&self.output),
            command: Arc::clone(&self.command),
            env: Arc::clone(&self.env),
            root: self.root.clone(),
        }
    }
}
