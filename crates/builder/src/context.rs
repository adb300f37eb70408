//! The integration the task runs inside of
//!
//! [`IntegrationContext`] is everything the task needs from the surrounding
//! CI engine: where artifacts go, how to resolve its base directory, which
//! properties to pass on, and where to put its results.
//! [`IntegrationResult`] is the in-memory implementation used by the CLI and
//! by tests.

use crate::properties::{IntegrationProperties, PropertyValue};
use crate::result::TaskResultFragment;
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

/// Services the surrounding integration provides to a task
pub trait IntegrationContext: Send {
    /// Directory owned by the integration where logs and outputs are collected
    fn artifact_directory(&self) -> &Path;

    /// Resolve a configured base directory against the working directory
    fn base_from_working_directory(&self, configured: &str) -> PathBuf;

    /// Properties to pass to the build tool as `-D:` definitions
    fn integration_properties(&self) -> IntegrationProperties;

    fn add_task_result(&mut self, fragment: TaskResultFragment);

    /// Progress hook, called once before the build tool starts
    fn signal_start_run_task(&mut self, _description: &str) {}
}

/// Why the integration was started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildCondition {
    #[default]
    IfModificationExists,
    ForceBuild,
}

impl fmt::Display for BuildCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IfModificationExists => write!(f, "IfModificationExists"),
            Self::ForceBuild => write!(f, "ForceBuild"),
        }
    }
}

/// Result of the previous integration, as known when this one starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrationStatus {
    #[default]
    Unknown,
    Success,
    Failure,
    Exception,
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::Exception => write!(f, "Exception"),
        }
    }
}

/// In-memory integration state for a single build
#[derive(Debug, Clone)]
pub struct IntegrationResult {
    pub project_name: String,
    pub label: String,
    pub working_directory: PathBuf,
    pub artifact_directory: PathBuf,
    pub build_condition: BuildCondition,
    pub status: IntegrationStatus,
    pub request_source: Option<String>,
    pub started_at: DateTime<Local>,
    /// Caller-supplied properties; these override the standard ones
    pub properties: IntegrationProperties,
    task_results: Vec<TaskResultFragment>,
    progress: Vec<String>,
}

impl IntegrationResult {
    /// Create an integration rooted at `working_directory`
    pub fn new(
        project_name: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        artifact_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            label: String::new(),
            working_directory: working_directory.into(),
            artifact_directory: artifact_directory.into(),
            build_condition: BuildCondition::default(),
            status: IntegrationStatus::default(),
            request_source: None,
            started_at: Local::now(),
            properties: IntegrationProperties::new(),
            task_results: Vec::new(),
            progress: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_build_condition(mut self, condition: BuildCondition) -> Self {
        self.build_condition = condition;
        self
    }

    #[must_use]
    pub fn with_request_source(mut self, source: impl Into<String>) -> Self {
        self.request_source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Set (or with `None`, explicitly null out) a property
    pub fn set_property(&mut self, name: impl Into<String>, value: Option<PropertyValue>) {
        self.properties.insert(name.into(), value);
    }

    /// Trailing digits of the label, or 0 when there are none
    #[must_use]
    pub fn numeric_label(&self) -> u64 {
        let digits: String = self
            .label
            .chars()
            .rev()
            .take_while(char::is_ascii_digit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().unwrap_or(0)
    }

    /// Conventional CI build metadata, before caller overrides
    #[must_use]
    pub fn standard_properties(&self) -> IntegrationProperties {
        let text = |value: String| Some(PropertyValue::Text(value));
        let mut properties = IntegrationProperties::new();
        properties.insert("CCNetProject".into(), text(self.project_name.clone()));
        properties.insert("CCNetLabel".into(), text(self.label.clone()));
        properties.insert(
            "CCNetNumericLabel".into(),
            Some(PropertyValue::Integer(
                i64::try_from(self.numeric_label()).unwrap_or(i64::MAX),
            )),
        );
        properties.insert(
            "CCNetBuildCondition".into(),
            text(self.build_condition.to_string()),
        );
        properties.insert(
            "CCNetIntegrationStatus".into(),
            text(self.status.to_string()),
        );
        properties.insert(
            "CCNetBuildDate".into(),
            text(self.started_at.format("%Y-%m-%d").to_string()),
        );
        properties.insert(
            "CCNetBuildTime".into(),
            text(self.started_at.format("%H:%M:%S").to_string()),
        );
        properties.insert(
            "CCNetArtifactDirectory".into(),
            text(self.artifact_directory.display().to_string()),
        );
        properties.insert(
            "CCNetWorkingDirectory".into(),
            text(self.working_directory.display().to_string()),
        );
        properties.insert(
            "CCNetRequestSource".into(),
            self.request_source.clone().map(PropertyValue::Text),
        );
        properties
    }

    #[must_use]
    pub fn task_results(&self) -> &[TaskResultFragment] {
        &self.task_results
    }

    #[must_use]
    pub fn progress_messages(&self) -> &[String] {
        &self.progress
    }
}

impl IntegrationContext for IntegrationResult {
    fn artifact_directory(&self) -> &Path {
        &self.artifact_directory
    }

    fn base_from_working_directory(&self, configured: &str) -> PathBuf {
        let configured = configured.trim();
        if configured.is_empty() {
            return self.working_directory.clone();
        }
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_directory.join(path)
        }
    }

    fn integration_properties(&self) -> IntegrationProperties {
        let mut properties = self.standard_properties();
        properties.extend(self.properties.clone());
        properties
    }

    fn add_task_result(&mut self, fragment: TaskResultFragment) {
        self.task_results.push(fragment);
    }

    fn signal_start_run_task(&mut self, description: &str) {
        self.progress.push(description.to_string());
    }
}
