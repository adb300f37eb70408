//! Build task configuration
//!
//! `TaskConfig` is the declarative description of one build-tool invocation.
//! It is bound from the `[task]` table of the configuration file (or built in
//! code) and handed to the task by value, so it cannot change while a build
//! is running.

use ntask_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default wall-clock limit for a build, in seconds
pub const DEFAULT_BUILD_TIMEOUT: u64 = 600;
/// File the build tool writes its structured log to, inside the artifact directory
pub const LOG_FILENAME: &str = "nant-results.xml";
pub const DEFAULT_EXECUTABLE: &str = "nant";
pub const DEFAULT_LOGGER: &str = "NAnt.Core.XmlLogger";
pub const DEFAULT_LISTENER: &str = "NAnt.Core.DefaultLogger";
pub const DEFAULT_NO_LOGO: bool = true;

/// Configuration for a single build-tool task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_executable")]
    pub executable: String,
    #[serde(default, alias = "buildFile")]
    pub build_file: String,
    /// Resolved against the integration's working directory; empty means the
    /// working directory itself
    #[serde(default, alias = "baseDirectory")]
    pub base_directory: String,
    /// Appended to the command line as-is
    #[serde(default, alias = "buildArgs")]
    pub build_args: String,
    #[serde(default = "default_logger")]
    pub logger: String,
    #[serde(default = "default_listener")]
    pub listener: String,
    #[serde(default, alias = "targetList")]
    pub targets: Vec<String>,
    #[serde(default = "default_no_logo", alias = "nologo")]
    pub no_logo: bool,
    /// 0 disables the timeout
    #[serde(default = "default_build_timeout", alias = "buildTimeoutSeconds")]
    pub build_timeout_seconds: u64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            build_file: String::new(),
            base_directory: String::new(),
            build_args: String::new(),
            logger: DEFAULT_LOGGER.to_string(),
            listener: DEFAULT_LISTENER.to_string(),
            targets: Vec::new(),
            no_logo: DEFAULT_NO_LOGO,
            build_timeout_seconds: DEFAULT_BUILD_TIMEOUT,
            description: None,
        }
    }
}

fn default_executable() -> String {
    DEFAULT_EXECUTABLE.to_string()
}

fn default_logger() -> String {
    DEFAULT_LOGGER.to_string()
}

fn default_listener() -> String {
    DEFAULT_LISTENER.to_string()
}

fn default_no_logo() -> bool {
    DEFAULT_NO_LOGO
}

fn default_build_timeout() -> u64 {
    DEFAULT_BUILD_TIMEOUT
}

impl TaskConfig {
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    #[must_use]
    pub fn with_build_file(mut self, build_file: impl Into<String>) -> Self {
        self.build_file = build_file.into();
        self
    }

    #[must_use]
    pub fn with_base_directory(mut self, base_directory: impl Into<String>) -> Self {
        self.base_directory = base_directory.into();
        self
    }

    #[must_use]
    pub fn with_build_args(mut self, build_args: impl Into<String>) -> Self {
        self.build_args = build_args.into();
        self
    }

    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_no_logo(mut self, no_logo: bool) -> Self {
        self.no_logo = no_logo;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.build_timeout_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Process timeout, or `None` when the build may run indefinitely
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        match self.build_timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_millis(seconds.saturating_mul(1000))),
        }
    }

    /// Targets joined one per line, for editing in a text area
    #[must_use]
    pub fn targets_for_presentation(&self) -> String {
        self.targets.join("\n")
    }

    /// Replace targets from a newline-separated list, dropping blank lines
    pub fn set_targets_from_presentation(&mut self, value: &str) {
        self.targets = value
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Check the fields the task cannot run without
    ///
    /// # Errors
    ///
    /// Returns an error if the executable is blank.
    pub fn validate(&self) -> Result<(), Error> {
        if self.executable.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "executable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl fmt::Display for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " BaseDirectory: {}, Targets: {}, Executable: {}, BuildFile: {}",
            self.base_directory,
            self.targets.join(", "),
            self.executable,
            self.build_file
        )
    }
}
