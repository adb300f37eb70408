//! The NAnt build task

use crate::arguments::{build_arguments, output_file};
use crate::context::IntegrationContext;
use crate::result::{aggregate, TaskOutcome};
use ntask_config::TaskConfig;
use ntask_errors::Error;
use ntask_platform::{ProcessExecutor, ProcessInfo, ProcessRunner};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs a NAnt build as one step of an integration
#[derive(Clone)]
pub struct NAntTask {
    config: TaskConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl NAntTask {
    /// Create a task that spawns real processes
    #[must_use]
    pub fn new(config: TaskConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessExecutor::new()))
    }

    /// Create a task with a custom process runner
    #[must_use]
    pub fn with_runner(config: TaskConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    #[must_use]
    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// Progress text announced when the task starts
    #[must_use]
    pub fn description(&self) -> String {
        match &self.config.description {
            Some(description) if !description.trim().is_empty() => description.clone(),
            _ => format!(
                "Executing Nant :BuildFile: {} Targets: {} ",
                self.config.build_file,
                self.config.targets.join(", ")
            ),
        }
    }

    /// The argument string the build tool would be started with
    #[must_use]
    pub fn process_arguments<C: IntegrationContext + ?Sized>(&self, ctx: &C) -> String {
        build_arguments(
            &self.config,
            ctx.artifact_directory(),
            &ctx.integration_properties(),
        )
    }

    #[must_use]
    pub fn process_base_directory<C: IntegrationContext + ?Sized>(&self, ctx: &C) -> PathBuf {
        ctx.base_from_working_directory(&self.config.base_directory)
    }

    /// The full invocation for this integration
    #[must_use]
    pub fn process_info<C: IntegrationContext + ?Sized>(&self, ctx: &C) -> ProcessInfo {
        ProcessInfo::new(
            self.config.executable.clone(),
            self.process_arguments(ctx),
            self.process_base_directory(ctx),
        )
        .with_timeout(self.config.timeout())
    }

    /// Run the build and attach its results to `ctx`
    ///
    /// A build that exits non-zero is `Ok(TaskOutcome::Failure)`. A build
    /// that exceeds its time limit is `Ok(TaskOutcome::FatalTimeout)`; callers
    /// that only want a pass/fail answer should use [`NAntTask::execute`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the process cannot
    /// be started, or `cancel` fires.
    pub async fn run<C: IntegrationContext + ?Sized>(
        &self,
        ctx: &mut C,
        cancel: &CancellationToken,
    ) -> Result<TaskOutcome, Error> {
        self.config.validate()?;
        ctx.signal_start_run_task(&self.description());

        let info = self.process_info(ctx);
        info!(
            executable = %info.program(),
            working_dir = %info.working_dir().display(),
            timeout_secs = self.config.build_timeout_seconds,
            "starting build"
        );

        let outcome = self.runner.execute(info, cancel).await?;
        let log_file = output_file(ctx.artifact_directory());
        let (result, status) =
            aggregate(outcome, &log_file, self.config.build_timeout_seconds).await;

        for fragment in result.into_fragments() {
            ctx.add_task_result(fragment);
        }

        match status {
            TaskOutcome::Success => info!("build succeeded"),
            TaskOutcome::Failure => warn!("build failed"),
            TaskOutcome::FatalTimeout { timeout_seconds } => {
                error!(timeout_seconds, "build timed out");
            }
        }
        Ok(status)
    }

    /// Run the build and report plain success or failure
    ///
    /// # Errors
    ///
    /// Returns `BuildError::Timeout` when the build exceeded its time limit,
    /// plus every error [`NAntTask::run`] can return.
    pub async fn execute<C: IntegrationContext + ?Sized>(&self, ctx: &mut C) -> Result<bool, Error> {
        self.run(ctx, &CancellationToken::new())
            .await?
            .into_result()
    }
}

impl fmt::Debug for NAntTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NAntTask")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for NAntTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.config, f)
    }
}
