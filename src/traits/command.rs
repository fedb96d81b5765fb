use anyhow::Result;
use std::path::Path;
use std::process::{Command, Output};
use tracing::{debug, warn};

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments and return its captured output
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], working_dir: &Path) -> Result<Output> {
        let output = Command::new(command)
            .args(args)
            .current_dir(working_dir)
            .output()?;

        Ok(output)
    }
}

/// What to do when an external command fails or cannot be started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Turn the failure into an error carrying the command line and stderr
    Propagate,
    /// Hand the failure back as a `CommandOutcome::Failure`
    Capture,
}

/// Result of running an external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success { stdout: String, stderr: String },
    /// `code` is `None` when the process could not be spawned at all
    Failure { code: Option<i32>, diagnostic: String },
}

impl CommandOutcome {
    /// Trimmed stdout of a successful run
    pub fn stdout(&self) -> Option<&str> {
        match self {
            CommandOutcome::Success { stdout, .. } => Some(stdout.trim()),
            CommandOutcome::Failure { .. } => None,
        }
    }

    /// Stdout and stderr of a successful run joined together.
    ///
    /// Several CLIs print their status lines on stderr.
    pub fn combined_output(&self) -> Option<String> {
        match self {
            CommandOutcome::Success { stdout, stderr } => Some(format!("{}\n{}", stdout, stderr)),
            CommandOutcome::Failure { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            CommandOutcome::Success { .. } => None,
            CommandOutcome::Failure { diagnostic, .. } => Some(diagnostic.as_str()),
        }
    }
}

/// Run an external command under the given failure policy
pub fn run_command(
    executor: &dyn CommandExecutor,
    program: &str,
    args: &[&str],
    working_dir: &Path,
    policy: FailurePolicy,
) -> Result<CommandOutcome> {
    let command_line = format_command_line(program, args);
    debug!(command = %command_line, dir = %working_dir.display(), "running command");

    let outcome = match executor.execute(program, args, working_dir) {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

            if output.status.success() {
                CommandOutcome::Success { stdout, stderr }
            } else {
                let diagnostic = if stderr.trim().is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr.trim().to_string()
                };
                CommandOutcome::Failure {
                    code: output.status.code(),
                    diagnostic,
                }
            }
        }
        Err(e) => CommandOutcome::Failure {
            code: None,
            diagnostic: format!("{:#}", e),
        },
    };

    if let CommandOutcome::Failure { code, diagnostic } = &outcome {
        warn!(command = %command_line, ?code, %diagnostic, "command failed");

        if policy == FailurePolicy::Propagate {
            let headline = match code {
                Some(code) => format!("`{}` exited with status {}", command_line, code),
                None => format!("Failed to run `{}`", command_line),
            };
            return Err(anyhow::anyhow!(diagnostic.clone()).context(headline));
        }
    }

    Ok(outcome)
}

fn format_command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mock command executor for testing
#[cfg(test)]
pub struct MockCommandExecutor {
    /// Pre-configured outputs for commands
    outputs: std::sync::Mutex<Vec<MockCommandResult>>,
    /// Every command line executed, in order
    calls: std::sync::Mutex<Vec<String>>,
}

/// A canned result, matched against the full command line by prefix
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Simulate a program that is not on the search path
    pub missing: bool,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn ok(command: &str, stdout: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            missing: false,
        }
    }

    pub fn fail(command: &str, exit_code: i32, stderr: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
            missing: false,
        }
    }

    pub fn missing(command: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            missing: true,
        }
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self {
            outputs: std::sync::Mutex::new(Vec::new()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: std::sync::Mutex::new(outputs),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn add_output(&self, output: MockCommandResult) {
        let mut outputs = self.outputs.lock().unwrap();
        outputs.push(output);
    }

    /// Command lines executed so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any executed command line starts with `prefix`
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c.starts_with(prefix))
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], _working_dir: &Path) -> Result<Output> {
        let line = format_command_line(command, args);
        self.calls.lock().unwrap().push(line.clone());

        let mut outputs = self.outputs.lock().unwrap();

        if let Some(result) = outputs.iter().position(|r| line.starts_with(&r.command)) {
            let mock_result = outputs.remove(result);
            if mock_result.missing {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{}: command not found", command),
                )
                .into());
            }
            return Ok(Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout.into_bytes(),
                stderr: mock_result.stderr.into_bytes(),
            });
        }

        // Default: successful empty output
        Ok(Output {
            status: create_exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(test)]
fn create_exit_status(code: i32) -> std::process::ExitStatus {
    // ExitStatus can't be constructed directly; build one from a raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        std::process::ExitStatus::from_raw((code & 0xff) << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        std::process::ExitStatus::from_raw(code as u32)
    }
}
