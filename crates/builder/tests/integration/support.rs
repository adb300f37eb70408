//! Test doubles shared by the integration tests

use async_trait::async_trait;
use ntask_errors::Error;
use ntask_platform::{ProcessInfo, ProcessOutcome, ProcessRunner};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runner that returns a canned outcome and records what it was asked to run
pub struct ScriptedRunner {
    outcome: ProcessOutcome,
    /// Written before returning, to simulate the build tool's log
    log: Option<(PathBuf, String)>,
    calls: Mutex<Vec<ProcessInfo>>,
}

impl ScriptedRunner {
    pub fn exiting(exit_code: i32) -> Self {
        Self::with_outcome(ProcessOutcome {
            stdout: format!("exit {exit_code}"),
            stderr: String::new(),
            exit_code: Some(exit_code),
            elapsed: Duration::from_millis(25),
            timed_out: false,
        })
    }

    pub fn timing_out() -> Self {
        Self::with_outcome(ProcessOutcome {
            stdout: "partial output".to_string(),
            stderr: String::new(),
            exit_code: None,
            elapsed: Duration::from_secs(5),
            timed_out: true,
        })
    }

    pub fn with_outcome(outcome: ProcessOutcome) -> Self {
        Self {
            outcome,
            log: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn writing_log(mut self, path: PathBuf, contents: &str) -> Self {
        self.log = Some((path, contents.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ProcessInfo> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn execute(
        &self,
        info: ProcessInfo,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, Error> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.calls.lock().unwrap().push(info);
        if let Some((path, contents)) = &self.log {
            tokio::fs::write(path, contents).await?;
        }
        Ok(self.outcome.clone())
    }
}
