pub mod command;
pub mod env_vars;
pub mod filesystem;
pub mod output;
pub mod user_input;

pub use command::{
    CommandExecutor, CommandOutcome, FailurePolicy, RealCommandExecutor, run_command,
};
pub use env_vars::{EnvVars, ProcessEnvVars};
pub use filesystem::{FileSystem, RealFileSystem};
pub use output::{Output, TerminalOutput};
pub use user_input::{InquireUserInput, UserInput};

#[cfg(test)]
pub use command::{MockCommandExecutor, MockCommandResult};
#[cfg(test)]
pub use env_vars::MockEnvVars;
#[cfg(test)]
pub use filesystem::MockFileSystem;
#[cfg(test)]
pub use output::{MockOutput, OutputMessage};
#[cfg(test)]
pub use user_input::{MockResponse, MockUserInput};
