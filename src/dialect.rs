//! Dispatch between the `.cfg` and markup engines by file extension.

use crate::cfg::{parse_cfg, CfgFile};
use crate::markup::{parse_markup, MarkupFile};
use crate::update::{FileUpdate, IgnoreReason, UpdateOutcome};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Cfg,
    Markup,
}

impl Dialect {
    /// `.cfg` and `.xml`, case-insensitive. Anything else is unsupported.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "cfg" => Some(Dialect::Cfg),
            "xml" => Some(Dialect::Markup),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Cfg => f.write_str("cfg"),
            Dialect::Markup => f.write_str("xml"),
        }
    }
}

/// A parsed file of either dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dialect", rename_all = "snake_case")]
pub enum Document {
    Cfg(CfgFile),
    Markup(MarkupFile),
}

impl Document {
    pub fn parse(dialect: Dialect, text: &str) -> Self {
        match dialect {
            Dialect::Cfg => Document::Cfg(parse_cfg(text)),
            Dialect::Markup => Document::Markup(parse_markup(text)),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Document::Cfg(_) => Dialect::Cfg,
            Document::Markup(_) => Dialect::Markup,
        }
    }

    pub fn line_count(&self) -> usize {
        match self {
            Document::Cfg(file) => file.len(),
            Document::Markup(file) => file.len(),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Document::Cfg(file) => file.render(),
            Document::Markup(file) => file.render(),
        }
    }

    /// Apply a single update. Never fails; see [`UpdateOutcome`].
    pub fn apply_update(&mut self, update: &FileUpdate) -> UpdateOutcome {
        if update.line_index >= self.line_count() {
            return UpdateOutcome::Ignored(IgnoreReason::OutOfRange);
        }

        match self {
            Document::Cfg(file) => {
                if file.set_value(update.line_index, update.value.as_str()) {
                    UpdateOutcome::Applied
                } else {
                    UpdateOutcome::Ignored(IgnoreReason::NotEditable)
                }
            }
            Document::Markup(file) => {
                let Some(name) = update.key.as_deref() else {
                    return UpdateOutcome::Ignored(IgnoreReason::MissingAttributeName);
                };
                if file.set_attribute(update.line_index, name, &update.value) {
                    UpdateOutcome::Applied
                } else {
                    UpdateOutcome::Ignored(IgnoreReason::UnknownAttribute)
                }
            }
        }
    }

    /// Apply updates in order, returning one outcome per update.
    pub fn apply(&mut self, updates: &[FileUpdate]) -> Vec<UpdateOutcome> {
        updates
            .iter()
            .map(|update| {
                let outcome = self.apply_update(update);
                if let UpdateOutcome::Ignored(reason) = outcome {
                    tracing::debug!(
                        line = update.line_index,
                        key = update.key.as_deref().unwrap_or(""),
                        %reason,
                        "update ignored"
                    );
                }
                outcome
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_path() {
        assert_eq!(Dialect::from_path("a/b/Server.cfg"), Some(Dialect::Cfg));
        assert_eq!(Dialect::from_path("Loot.XML"), Some(Dialect::Markup));
        assert_eq!(Dialect::from_path("notes.txt"), None);
        assert_eq!(Dialect::from_path("Makefile"), None);
    }

    #[test]
    fn test_cfg_updates() {
        let mut doc = Document::parse(Dialect::Cfg, "// c\na = 1;\n");
        let outcomes = doc.apply(&[
            FileUpdate::value(0, "x"),
            FileUpdate::value(1, "2"),
            FileUpdate::value(9, "y"),
        ]);
        assert_eq!(
            outcomes,
            vec![
                UpdateOutcome::Ignored(IgnoreReason::NotEditable),
                UpdateOutcome::Applied,
                UpdateOutcome::Ignored(IgnoreReason::OutOfRange),
            ]
        );
        assert_eq!(doc.render(), "// c\na = 2;\n");
    }

    #[test]
    fn test_markup_updates() {
        let mut doc = Document::parse(Dialect::Markup, "<a b=\"1\"/>\n");
        let outcomes = doc.apply(&[
            FileUpdate::value(0, "x"),
            FileUpdate::attribute(0, "c", "x"),
            FileUpdate::attribute(0, "b", "2"),
        ]);
        assert_eq!(
            outcomes,
            vec![
                UpdateOutcome::Ignored(IgnoreReason::MissingAttributeName),
                UpdateOutcome::Ignored(IgnoreReason::UnknownAttribute),
                UpdateOutcome::Applied,
            ]
        );
        assert_eq!(doc.render(), "<a b=\"2\"/>\n");
    }
}
