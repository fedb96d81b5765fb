pub mod init;
pub mod tag_create;
pub mod tag_status;

pub use init::InitCommand;
pub use tag_create::TagCreateCommand;
pub use tag_status::TagStatusCommand;

/// How a command finished; decides the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Completed,
    CompletedWithWarnings,
    /// The operator declined to go ahead
    Cancelled,
    Failed,
}

impl CommandStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandStatus::Failed => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_failure_exits_non_zero() {
        assert_eq!(CommandStatus::Completed.exit_code(), 0);
        assert_eq!(CommandStatus::CompletedWithWarnings.exit_code(), 0);
        assert_eq!(CommandStatus::Cancelled.exit_code(), 0);
        assert_eq!(CommandStatus::Failed.exit_code(), 1);
    }
}
