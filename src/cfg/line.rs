use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Classification of a `.cfg` line, decided once at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Config,
    Comment,
    Empty,
    Unrecognized,
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::Config => "config",
            LineKind::Comment => "comment",
            LineKind::Empty => "empty",
            LineKind::Unrecognized => "unrecognized",
        };
        f.write_str(name)
    }
}

/// Display-only data read from an inline `// [type: T; default: D] Description`
/// annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub value_type: String,
    pub default: String,
    pub description: String,
}

/// The editable part of a config line.
///
/// Invariant: before any edit, `prefix + value + suffix` equals the raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) metadata: Option<Metadata>,
}

impl ConfigEntry {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Bytes before the value: key, `=` and the spacing after it.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Bytes after the value: trailing spacing, `;`, comment and line terminator.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineBody {
    Config(ConfigEntry),
    Comment,
    Empty,
    Unrecognized,
}

/// One physical line of a `.cfg` file, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgLine {
    pub(crate) index: usize,
    pub(crate) raw: String,
    pub(crate) body: LineBody,
}

impl CfgLine {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> LineKind {
        match self.body {
            LineBody::Config(_) => LineKind::Config,
            LineBody::Comment => LineKind::Comment,
            LineBody::Empty => LineKind::Empty,
            LineBody::Unrecognized => LineKind::Unrecognized,
        }
    }

    /// The line exactly as it was read.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entry(&self) -> Option<&ConfigEntry> {
        match &self.body {
            LineBody::Config(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.entry().map(ConfigEntry::key)
    }

    pub fn value(&self) -> Option<&str> {
        self.entry().map(ConfigEntry::value)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.entry().and_then(ConfigEntry::metadata)
    }

    /// Replace the value of a config line.
    ///
    /// Returns `false` and leaves the line untouched for any other kind.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        match &mut self.body {
            LineBody::Config(entry) => {
                entry.value = value.into();
                true
            }
            _ => false,
        }
    }

    fn write_to(&self, out: &mut String) {
        match &self.body {
            LineBody::Config(entry) => {
                out.push_str(&entry.prefix);
                out.push_str(&entry.value);
                out.push_str(&entry.suffix);
            }
            _ => out.push_str(&self.raw),
        }
    }
}

// Serialized for `show --json`; the reconstruction fragments stay internal.
impl Serialize for CfgLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CfgLine", 5)?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("key", &self.key())?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("metadata", &self.metadata())?;
        state.end()
    }
}

/// A parsed `.cfg` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CfgFile {
    lines: Vec<CfgLine>,
}

impl CfgFile {
    pub(crate) fn from_lines(lines: Vec<CfgLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CfgLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&CfgLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the first config line with the given key.
    pub fn find_key(&self, key: &str) -> Option<&CfgLine> {
        self.lines.iter().find(|line| line.key() == Some(key))
    }

    /// Set the value of line `index`.
    ///
    /// Out-of-range indices and non-config lines are ignored (returns `false`).
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => line.set_value(value),
            None => false,
        }
    }

    /// Reassemble the file text, applying any edited values in place.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.lines.iter().map(|l| l.raw.len()).sum());
        for line in &self.lines {
            line.write_to(&mut out);
        }
        out
    }
}

impl fmt::Display for CfgFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::parse_cfg;

    #[test]
    fn test_set_value_rejects_non_config_lines() {
        let mut file = parse_cfg("// disabled\n\nwat\n");
        for index in 0..3 {
            assert!(!file.set_value(index, "1"));
        }
        assert_eq!(file.render(), "// disabled\n\nwat\n");
    }

    #[test]
    fn test_set_value_out_of_range_is_noop() {
        let mut file = parse_cfg("a = 1;\n");
        assert!(!file.set_value(7, "2"));
        assert_eq!(file.render(), "a = 1;\n");
    }

    #[test]
    fn test_kind_never_changes_after_edit() {
        let mut file = parse_cfg("a = 1;\n");
        assert!(file.set_value(0, ""));
        assert_eq!(file.lines()[0].kind(), LineKind::Config);
        assert_eq!(file.render(), "a = ;\n");
    }

    #[test]
    fn test_find_key() {
        let file = parse_cfg("a = 1;\nb = 2;\n");
        assert_eq!(file.find_key("b").map(CfgLine::index), Some(1));
        assert!(file.find_key("c").is_none());
    }

    #[test]
    fn test_serialized_shape_hides_fragments() {
        let file = parse_cfg("a = 1; // [type: int; default: 0] A\n");
        let json = serde_json::to_value(&file).unwrap();
        let line = &json["lines"][0];
        assert_eq!(line["kind"], "config");
        assert_eq!(line["key"], "a");
        assert_eq!(line["metadata"]["type"], "int");
        assert!(line.get("prefix").is_none());
    }
}
