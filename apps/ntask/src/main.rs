//! ntask - run NAnt builds as bounded integration tasks
//!
//! Loads the task configuration, builds the integration context from the
//! command line, and drives a single build to completion.

mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Commands, TaskArgs};
use crate::error::{CliError, EXIT_FAILURE, EXIT_SUCCESS, EXIT_TIMEOUT};
use clap::Parser;
use ntask_builder::{
    BuildCondition, IntegrationContext, IntegrationResult, NAntTask, PropertyValue, TaskOutcome,
    TaskResultFragment,
};
use ntask_config::Config;
use serde::Serialize;
use std::path::Path;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let code = match run(cli, &cancel).await {
        Ok(code) => code,
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            e.exit_code()
        }
    };
    process::exit(code);
}

/// Main application logic, returning the process exit status
async fn run(cli: Cli, cancel: &CancellationToken) -> Result<i32, CliError> {
    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, cli.command.task_args());

    let artifact_dir = config.artifact_directory();
    logging::init_tracing(cli.global.json, cli.global.debug, &artifact_dir);
    info!("Starting ntask v{}", env!("CARGO_PKG_VERSION"));

    config.task.validate()?;
    let mut ctx = build_integration(&config);
    let task = NAntTask::new(config.task.clone());

    match cli.command {
        Commands::Args(_) => {
            render_invocation(&task, &ctx, cli.global.json)?;
            Ok(EXIT_SUCCESS)
        }
        Commands::Run(_) => {
            tokio::fs::create_dir_all(&artifact_dir)
                .await
                .map_err(|e| ntask_errors::Error::io_with_path(&e, &artifact_dir))?;
            let outcome = task.run(&mut ctx, cancel).await?;
            render_outcome(outcome, &ctx, cli.global.json)?;
            info!(?outcome, "Command completed");
            Ok(match outcome {
                TaskOutcome::Success => EXIT_SUCCESS,
                TaskOutcome::Failure => EXIT_FAILURE,
                TaskOutcome::FatalTimeout { .. } => EXIT_TIMEOUT,
            })
        }
    }
}

/// Apply command-line overrides; these take precedence over file and env
fn apply_cli_config(config: &mut Config, args: &TaskArgs) {
    if let Some(dir) = &args.working_dir {
        config.integration.working_directory = Some(dir.clone());
    }
    if let Some(dir) = &args.artifact_dir {
        config.integration.artifact_directory = Some(dir.clone());
    }
    if let Some(project) = &args.project {
        config.integration.project = Some(project.clone());
    }
    if let Some(label) = &args.label {
        config.integration.label = Some(label.clone());
    }
    if let Some(build_file) = &args.build_file {
        config.task.build_file.clone_from(build_file);
    }
    if !args.targets.is_empty() {
        config.task.targets.clone_from(&args.targets);
    }
    if let Some(timeout) = args.timeout {
        config.task.build_timeout_seconds = timeout;
    }
    for (name, value) in &args.define {
        config
            .integration
            .properties
            .insert(name.clone(), value.clone());
    }
}

fn build_integration(config: &Config) -> IntegrationResult {
    let working_dir = config.working_directory();
    let project = config
        .integration
        .project
        .clone()
        .or_else(|| {
            working_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "ntask".to_string());

    let mut ctx = IntegrationResult::new(project, working_dir, config.artifact_directory())
        .with_build_condition(BuildCondition::ForceBuild)
        .with_request_source("ntask");
    if let Some(label) = &config.integration.label {
        ctx = ctx.with_label(label.clone());
    }
    for (name, value) in &config.integration.properties {
        ctx.set_property(name.clone(), Some(PropertyValue::from(value.as_str())));
    }
    ctx
}

#[derive(Serialize)]
struct Invocation<'a> {
    executable: &'a str,
    arguments: &'a str,
    working_directory: &'a Path,
    timeout_seconds: Option<u64>,
}

fn render_invocation(
    task: &NAntTask,
    ctx: &IntegrationResult,
    json: bool,
) -> Result<(), CliError> {
    let info = task.process_info(ctx);
    if json {
        let invocation = Invocation {
            executable: info.program(),
            arguments: info.arguments(),
            working_directory: info.working_dir(),
            timeout_seconds: info.timeout().map(|t| t.as_secs()),
        };
        println!("{}", serde_json::to_string_pretty(&invocation)?);
    } else {
        println!("{} {}", info.program(), info.arguments());
    }
    Ok(())
}

#[derive(Serialize)]
struct Summary<'a> {
    outcome: TaskOutcome,
    artifact_directory: &'a Path,
    fragments: &'a [TaskResultFragment],
}

fn render_outcome(
    outcome: TaskOutcome,
    ctx: &IntegrationResult,
    json: bool,
) -> Result<(), CliError> {
    if json {
        let summary = Summary {
            outcome,
            artifact_directory: ctx.artifact_directory(),
            fragments: ctx.task_results(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for fragment in ctx.task_results() {
        match fragment {
            TaskResultFragment::Process(process) => {
                let data = process.data();
                if !data.trim().is_empty() {
                    println!("{}", data.trim_end());
                }
            }
            TaskResultFragment::File(file) => {
                eprintln!("Build log: {}", file.path.display());
            }
        }
    }
    match outcome {
        TaskOutcome::Success => eprintln!("Build succeeded"),
        TaskOutcome::Failure => eprintln!("Build failed"),
        TaskOutcome::FatalTimeout { timeout_seconds } => {
            eprintln!("Build timed out after {timeout_seconds} seconds");
        }
    }
    Ok(())
}
