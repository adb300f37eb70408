//! Command-line assembly for the build tool
//!
//! The argument string is part of the task's observable contract: identical
//! configuration and properties must always yield a byte-identical string.
//! Fragment order is fixed and dynamic properties are sorted by name.

use crate::properties::IntegrationProperties;
use ntask_config::{TaskConfig, LOG_FILENAME};
use std::path::Path;

/// Accumulates arguments separated by single spaces, skipping blank ones
#[derive(Debug, Default, Clone)]
pub struct ProcessArgumentBuilder {
    buffer: String,
}

impl ProcessArgumentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `arg` (trimmed) unless it is blank
    pub fn append_argument(&mut self, arg: &str) -> &mut Self {
        let arg = arg.trim();
        if !arg.is_empty() {
            self.append_raw(arg);
        }
        self
    }

    /// Append `prefix` immediately followed by `value`, unless `value` is blank
    pub fn append_prefixed(&mut self, prefix: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() {
            self.append_raw(&format!("{prefix}{value}"));
        }
        self
    }

    pub fn append_if(&mut self, condition: bool, arg: &str) -> &mut Self {
        if condition {
            self.append_argument(arg);
        }
        self
    }

    fn append_raw(&mut self, arg: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(arg);
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn build(self) -> String {
        self.buffer
    }
}

/// Wrap `value` in double quotes if it contains whitespace and no quotes yet
#[must_use]
pub fn auto_double_quote(value: &str) -> String {
    if !value.is_empty() && value.contains(char::is_whitespace) && !value.contains('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Strip every trailing `/` or `\`
///
/// A quoted value must not end in a backslash, or the closing quote would be
/// read as escaped when the command line is split.
#[must_use]
pub fn remove_trailing_path_delimiter(value: &str) -> &str {
    value.trim_end_matches(['/', '\\'])
}

/// Location of the build tool's structured log inside the artifact directory
#[must_use]
pub fn output_file(artifact_dir: &Path) -> std::path::PathBuf {
    artifact_dir.join(LOG_FILENAME)
}

/// Assemble the full argument string for one build
#[must_use]
pub fn build_arguments(
    config: &TaskConfig,
    artifact_dir: &Path,
    properties: &IntegrationProperties,
) -> String {
    let mut args = ProcessArgumentBuilder::new();
    args.append_if(config.no_logo, "-nologo");
    args.append_prefixed("-buildfile:", &auto_double_quote(&config.build_file));
    args.append_prefixed("-logger:", &config.logger);
    args.append_prefixed(
        "-logfile:",
        &auto_double_quote(&output_file(artifact_dir).display().to_string()),
    );
    args.append_prefixed("-listener:", &config.listener);
    args.append_argument(&config.build_args);
    append_properties(&mut args, properties);
    for target in &config.targets {
        args.append_argument(target);
    }
    args.build()
}

fn append_properties(args: &mut ProcessArgumentBuilder, properties: &IntegrationProperties) {
    // HashMap iteration order is random; sort so the command line is stable.
    let mut defined: Vec<_> = properties
        .iter()
        .filter_map(|(name, value)| value.as_ref().map(|value| (name, value)))
        .collect();
    defined.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, value) in defined {
        let rendered = value.to_argument_string();
        let value = auto_double_quote(remove_trailing_path_delimiter(&rendered));
        args.append_argument(&format!("-D:{name}={value}"));
    }
}
