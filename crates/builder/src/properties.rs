//! Dynamic build properties supplied by the integration

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Properties keyed by name; `None` values are never passed to the build tool
pub type IntegrationProperties = HashMap<String, Option<PropertyValue>>;

/// A single property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    List(Vec<String>),
}

impl PropertyValue {
    /// Render the value as it appears on the command line, before quoting
    ///
    /// Lists collapse to their only element, or to a space-joined string when
    /// they hold several.
    #[must_use]
    pub fn to_argument_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::List(items) => match items.as_slice() {
                [] => String::new(),
                [single] => single.clone(),
                many => many.join(" "),
            },
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_argument_string())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}
