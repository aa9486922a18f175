//! Field-level edit requests against a parsed document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One edit: set the value at `line_index`.
///
/// For `.cfg` files `key` is ignored. For markup files it names the attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpdate {
    pub line_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl FileUpdate {
    pub fn value(line_index: usize, value: impl Into<String>) -> Self {
        Self {
            line_index,
            key: None,
            value: value.into(),
        }
    }

    pub fn attribute(line_index: usize, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            line_index,
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// Why an update had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Line index past the end of the file.
    OutOfRange,
    /// The line has no editable value (comment, empty, unrecognized).
    NotEditable,
    /// No attribute with the requested name on the line.
    UnknownAttribute,
    /// Markup update without an attribute name.
    MissingAttributeName,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IgnoreReason::OutOfRange => "line index out of range",
            IgnoreReason::NotEditable => "line is not editable",
            IgnoreReason::UnknownAttribute => "no such attribute on line",
            IgnoreReason::MissingAttributeName => "attribute name missing",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied,
    Ignored(IgnoreReason),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }
}
