//! Process execution errors
//!
//! These are infrastructure failures: the build tool could not be started or
//! reclaimed. They are surfaced immediately and never retried by the task.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlatformError {
    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("working directory not found: {path}")]
    WorkingDirectoryNotFound { path: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => {
                Some("Install the build tool or set `executable` to its full path.")
            }
            Self::WorkingDirectoryNotFound { .. } => {
                Some("Check `base_directory` and the working directory passed to the task.")
            }
            Self::ProcessExecutionFailed { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessExecutionFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::WorkingDirectoryNotFound { .. } => "platform.working_directory_not_found",
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
        };
        Some(code)
    }
}
