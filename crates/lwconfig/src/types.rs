//! Core types for Likewise Open settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A single setting as reported by `lwconfig --dump`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// Setting name (e.g., "AssumeDefaultDomain")
    pub name: String,
    /// Setting value, always text
    pub value: String,
}

/// Snapshot of the whole setting space at the time of one dump.
///
/// Keys are unique and iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a setting, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Look up the value of a setting.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Whether the snapshot contains a setting.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of settings in the snapshot.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert into owned [`Setting`] records.
    pub fn into_settings(self) -> Vec<Setting> {
        self.values
            .into_iter()
            .map(|(name, value)| Setting { name, value })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut settings = Self::new();
        for (name, value) in iter {
            settings.insert(name, value);
        }
        settings
    }
}

/// Desired state for one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredSetting {
    /// Setting name
    pub name: String,
    /// Desired value
    pub value: String,
}

impl DesiredSetting {
    /// Create a desired setting.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for DesiredSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.name, self.value)
    }
}

/// How to invoke the lwconfig program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConfig {
    /// Program name or path
    pub program: String,
    /// Arguments that make the program print every setting
    pub dump_args: Vec<String>,
    /// Per-invocation timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

/// Default timeout for a single lwconfig invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: "lwconfig".to_string(),
            dump_args: vec!["--dump".to_string()],
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl CommandConfig {
    /// Use a different program.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Human-readable dump command line, used in diagnostics.
    pub fn dump_command(&self) -> String {
        command_line(&self.program, self.dump_args.iter().map(String::as_str))
    }
}

/// Join a program and its arguments into a display string.
pub(crate) fn command_line<'a>(program: &str, args: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            line.push_str(&format!("{arg:?}"));
        } else {
            line.push_str(arg);
        }
    }
    line
}
