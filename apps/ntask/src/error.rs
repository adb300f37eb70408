//! CLI error handling

use std::fmt;

use ntask_errors::UserFacingError;

pub const EXIT_SUCCESS: i32 = 0;
/// The build ran and reported failure
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_TIMEOUT: i32 = 2;
/// Process exit status for infrastructure and configuration errors
pub const EXIT_INFRASTRUCTURE: i32 = 3;
/// Process exit status after Ctrl-C, as a shell would report SIGINT
pub const EXIT_CANCELLED: i32 = 130;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Task, configuration or platform error
    Task(ntask_errors::Error),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Exit status the process should end with
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Task(ntask_errors::Error::Cancelled) => EXIT_CANCELLED,
            CliError::Task(e) if e.is_timeout() => EXIT_TIMEOUT,
            _ => EXIT_INFRASTRUCTURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Task(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Task(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<ntask_errors::Error> for CliError {
    fn from(e: ntask_errors::Error) -> Self {
        CliError::Task(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Task(e.into())
    }
}
