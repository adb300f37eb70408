//! Process execution types and the runner abstraction

mod command_line;

use async_trait::async_trait;
use ntask_errors::Error;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use command_line::split_command_line;

/// A fully resolved build-tool invocation
///
/// Built once per run and handed to a [`ProcessRunner`] by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    program: String,
    arguments: String,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessInfo {
    /// Create a new invocation with no timeout
    pub fn new(
        program: impl Into<String>,
        arguments: impl Into<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Set the wall-clock limit, `None` meaning unbounded
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the argument string as it was assembled
    #[must_use]
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Get the working directory
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Everything observed about one finished (or killed) process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub timed_out: bool,
}

impl ProcessOutcome {
    /// Whether the build tool reported failure through its exit status
    #[must_use]
    pub fn failed(&self) -> bool {
        self.exit_code != Some(0)
    }
}

fn serialize_millis<S>(duration: &Duration, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Trait for running a build tool to completion
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the process, racing its exit against the timeout and `cancel`
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be started, if the working
    /// directory does not exist, or if `cancel` fires before the process
    /// exits (`Error::Cancelled`).
    async fn execute(
        &self,
        info: ProcessInfo,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, Error>;
}
