mod argument_properties;
mod support;
mod task_execution;
#[cfg(unix)]
mod task_process;
