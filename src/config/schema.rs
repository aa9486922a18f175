use crate::history::DEFAULT_HISTORY_LIMIT;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "settings-editor.toml";

fn default_root() -> PathBuf {
    PathBuf::from("./TerjeSettings")
}

fn default_history_file() -> PathBuf {
    PathBuf::from("settings_history.json")
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Directory holding the `.cfg` and `.xml` settings files.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Snapshot store. Relative paths resolve against the config file's directory.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    /// Entries shown by `history` when no limit is given.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            history_file: default_history_file(),
            history_limit: default_history_limit(),
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.root.as_os_str().is_empty() {
            issues.push(ValidationIssue::EmptyPath { field: "root" });
        }
        if self.history_file.as_os_str().is_empty() {
            issues.push(ValidationIssue::EmptyPath {
                field: "history_file",
            });
        }
        if self.history_limit == 0 {
            issues.push(ValidationIssue::ZeroLimit {
                field: "history_limit",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Resolve relative paths against `base` (the config file's directory).
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        if self.root.is_relative() {
            self.root = base.join(&self.root);
        }
        if self.history_file.is_relative() {
            self.history_file = base.join(&self.history_file);
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyPath { field: &'static str },
    ZeroLimit { field: &'static str },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPath { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::ZeroLimit { field } => write!(f, "'{field}' must be at least 1"),
        }
    }
}
