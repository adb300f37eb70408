#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for ntask
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/ntask/task.toml)
//! - Environment variables
//! - CLI flags (applied by the caller)

mod task;

pub use task::{
    TaskConfig, DEFAULT_BUILD_TIMEOUT, DEFAULT_EXECUTABLE, DEFAULT_LISTENER, DEFAULT_LOGGER,
    DEFAULT_NO_LOGO, LOG_FILENAME,
};

use ntask_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub task: TaskConfig,

    #[serde(default)]
    pub integration: IntegrationSettings,
}

/// Where and as what the build runs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IntegrationSettings {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub working_directory: Option<PathBuf>,
    pub artifact_directory: Option<PathBuf>,
    /// Extra `-D:` definitions passed to the build tool
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("ntask").join("task.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded task configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // NTASK_EXECUTABLE
        if let Ok(executable) = std::env::var("NTASK_EXECUTABLE") {
            self.task.executable = executable;
        }

        // NTASK_BUILD_FILE
        if let Ok(build_file) = std::env::var("NTASK_BUILD_FILE") {
            self.task.build_file = build_file;
        }

        // NTASK_BUILD_TIMEOUT
        if let Ok(timeout) = std::env::var("NTASK_BUILD_TIMEOUT") {
            self.task.build_timeout_seconds =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "NTASK_BUILD_TIMEOUT".to_string(),
                    value: timeout,
                })?;
        }

        // NTASK_NOLOGO
        if let Ok(no_logo) = std::env::var("NTASK_NOLOGO") {
            self.task.no_logo = match no_logo.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "NTASK_NOLOGO".to_string(),
                        value: no_logo,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Get the working directory (with default)
    #[must_use]
    pub fn working_directory(&self) -> PathBuf {
        self.integration
            .working_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the artifact directory (defaults to `<working dir>/artifacts`)
    #[must_use]
    pub fn artifact_directory(&self) -> PathBuf {
        self.integration
            .artifact_directory
            .clone()
            .unwrap_or_else(|| self.working_directory().join("artifacts"))
    }
}
