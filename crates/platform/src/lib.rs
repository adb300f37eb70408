#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Process execution engine for ntask
//!
//! This crate starts the build tool as a child process and bounds how long
//! it may run:
//! - the assembled argument string is split into argv with Windows-style quoting
//! - stdout and stderr are buffered in full
//! - process exit, the timeout deadline and caller cancellation race in a single select
//! - on timeout or cancellation the whole process group is killed and reaped

pub mod implementations;
pub mod process;

pub use implementations::native::ProcessExecutor;
pub use process::{split_command_line, ProcessInfo, ProcessOutcome, ProcessRunner};
