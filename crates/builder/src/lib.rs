#![deny(clippy::pedantic, unsafe_code)]
//! NAnt build task for ntask
//!
//! This crate turns a [`TaskConfig`] and an [`IntegrationContext`] into a
//! single build-tool invocation, runs it under a time limit, and reports the
//! outcome as ordered result fragments.

pub mod arguments;
pub mod context;
pub mod properties;
pub mod result;
pub mod task;

pub use arguments::{build_arguments, output_file, ProcessArgumentBuilder};
pub use context::{BuildCondition, IntegrationContext, IntegrationResult, IntegrationStatus};
pub use properties::{IntegrationProperties, PropertyValue};
pub use result::{
    aggregate, FileTaskResult, ProcessTaskResult, TaskOutcome, TaskResult, TaskResultFragment,
};
pub use task::NAntTask;

pub use ntask_config::TaskConfig;
