//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// ntask - run NAnt builds as bounded integration tasks
#[derive(Parser)]
#[command(name = "ntask")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run NAnt builds as bounded integration tasks")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs as JSON to the artifact directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the build
    Run(TaskArgs),

    /// Print the command line `run` would use, without running it
    Args(TaskArgs),
}

impl Commands {
    pub fn task_args(&self) -> &TaskArgs {
        match self {
            Commands::Run(args) | Commands::Args(args) => args,
        }
    }
}

/// Inputs shared by `run` and `args`
#[derive(Args, Debug, Default)]
pub struct TaskArgs {
    /// Integration working directory
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Directory receiving the build log and other outputs
    #[arg(long, value_name = "DIR")]
    pub artifact_dir: Option<PathBuf>,

    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,

    #[arg(long)]
    pub label: Option<String>,

    /// Build file passed as -buildfile
    #[arg(long, value_name = "FILE")]
    pub build_file: Option<String>,

    /// Define a build property (repeatable)
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define)]
    pub define: Vec<(String, String)>,

    /// Target to run (repeatable, in order)
    #[arg(long = "target", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Build timeout in seconds (0 disables the limit)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("property name missing in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}
