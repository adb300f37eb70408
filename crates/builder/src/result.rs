//! Task results and run classification

use ntask_errors::{BuildError, Error};
use ntask_platform::ProcessOutcome;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Contents of the structured log the build tool left behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTaskResult {
    pub path: PathBuf,
    pub contents: String,
}

impl FileTaskResult {
    /// Read `path` into a result fragment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read(path: &Path) -> Result<Self, Error> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| BuildError::ResultFileUnreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            contents: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// The raw process outcome as a result fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessTaskResult {
    pub outcome: ProcessOutcome,
}

impl ProcessTaskResult {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.outcome.failed() && !self.outcome.timed_out
    }

    /// Standard output followed by standard error, if there was any
    #[must_use]
    pub fn data(&self) -> String {
        let stderr = self.outcome.stderr.trim_end();
        if stderr.is_empty() {
            self.outcome.stdout.clone()
        } else {
            format!("{}\n{stderr}", self.outcome.stdout.trim_end())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskResultFragment {
    File(FileTaskResult),
    Process(ProcessTaskResult),
}

/// Ordered fragments produced by one task run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    fragments: Vec<TaskResultFragment>,
}

impl TaskResult {
    #[must_use]
    pub fn fragments(&self) -> &[TaskResultFragment] {
        &self.fragments
    }

    #[must_use]
    pub fn into_fragments(self) -> Vec<TaskResultFragment> {
        self.fragments
    }

    #[must_use]
    pub fn file(&self) -> Option<&FileTaskResult> {
        self.fragments.iter().find_map(|f| match f {
            TaskResultFragment::File(file) => Some(file),
            TaskResultFragment::Process(_) => None,
        })
    }

    #[must_use]
    pub fn process(&self) -> Option<&ProcessTaskResult> {
        self.fragments.iter().find_map(|f| match f {
            TaskResultFragment::Process(process) => Some(process),
            TaskResultFragment::File(_) => None,
        })
    }
}

/// Terminal state of a task run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Success,
    /// The build tool ran to completion and reported failure
    Failure,
    /// The build exceeded its time limit; the integration must not continue
    FatalTimeout { timeout_seconds: u64 },
}

impl TaskOutcome {
    /// Classify a process outcome; a timeout wins over any exit code
    #[must_use]
    pub fn classify(outcome: &ProcessOutcome, timeout_seconds: u64) -> Self {
        if outcome.timed_out {
            Self::FatalTimeout { timeout_seconds }
        } else if outcome.failed() {
            Self::Failure
        } else {
            Self::Success
        }
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::FatalTimeout { .. })
    }

    /// Collapse into the boolean pass/fail signal, raising the fatal timeout
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Timeout` for `FatalTimeout`.
    pub fn into_result(self) -> Result<bool, Error> {
        match self {
            Self::Success => Ok(true),
            Self::Failure => Ok(false),
            Self::FatalTimeout { timeout_seconds } => Err(BuildError::Timeout {
                seconds: timeout_seconds,
            }
            .into()),
        }
    }
}

/// Combine the process outcome with the build tool's log file, if any
///
/// The file is attached whenever it exists and can be read, independent of
/// how the process ended. A log that exists but cannot be read is reported
/// with a warning and left out. The process fragment always comes last.
pub async fn aggregate(
    outcome: ProcessOutcome,
    output_file: &Path,
    timeout_seconds: u64,
) -> (TaskResult, TaskOutcome) {
    let classification = TaskOutcome::classify(&outcome, timeout_seconds);
    let mut fragments = Vec::with_capacity(2);

    let exists = fs::metadata(output_file)
        .await
        .is_ok_and(|meta| meta.is_file());
    if exists {
        match FileTaskResult::read(output_file).await {
            Ok(file) => fragments.push(TaskResultFragment::File(file)),
            Err(err) => warn!(error = %err, "build log present but unreadable; skipping it"),
        }
    } else {
        debug!(path = %output_file.display(), "no build log produced");
    }

    fragments.push(TaskResultFragment::Process(ProcessTaskResult { outcome }));
    (TaskResult { fragments }, classification)
}
