//! Build tool error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    /// The build tool exceeded its wall-clock window and was killed.
    #[error("NAnt process timed out (after {seconds} seconds)")]
    Timeout { seconds: u64 },

    #[error("failed to read build results from {path}: {message}")]
    ResultFileUnreadable { path: String, message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } => Some(
                "Increase build_timeout_seconds (0 disables the limit) or investigate the hung build.",
            ),
            Self::ResultFileUnreadable { .. } => {
                Some("Check permissions on the artifact directory.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "build.timeout",
            Self::ResultFileUnreadable { .. } => "build.result_file_unreadable",
        };
        Some(code)
    }
}
