//! Native process execution on the Tokio runtime

pub mod process;

pub use process::ProcessExecutor;
