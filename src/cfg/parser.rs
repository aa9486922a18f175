//! Line tokenizer for the `.cfg` dialect.
//!
//! Parsing is total: a line that does not match the config grammar is kept as
//! [`LineKind::Unrecognized`](super::LineKind::Unrecognized) passthrough.

use super::line::{CfgFile, CfgLine, ConfigEntry, LineBody, Metadata};
use regex::Regex;
use std::sync::LazyLock;

/// `key =<spaces>` | `value` | `;rest-of-line`
static CONFIG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^=]+=[ \t]*)([^;]+)(;.*)$").expect("valid config regex"));

/// `// [type: T; default: D] Description`
static ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\s*\[type:\s*([^;]+);\s*default:\s*([^\]]+)\]\s*(.*)")
        .expect("valid annotation regex")
});

const COMMENT_MARKER: &str = "//";

/// Parse `.cfg` text into lines. Never fails.
pub fn parse_cfg(text: &str) -> CfgFile {
    let lines = text
        .split_inclusive('\n')
        .enumerate()
        .map(|(index, raw)| parse_line(raw, index))
        .collect();
    CfgFile::from_lines(lines)
}

fn parse_line(raw: &str, index: usize) -> CfgLine {
    let trimmed = raw.trim();
    let body = if trimmed.is_empty() {
        LineBody::Empty
    } else if trimmed.starts_with(COMMENT_MARKER) {
        LineBody::Comment
    } else {
        match parse_entry(raw) {
            Some(entry) => LineBody::Config(entry),
            None => LineBody::Unrecognized,
        }
    };

    CfgLine {
        index,
        raw: raw.to_string(),
        body,
    }
}

fn parse_entry(raw: &str) -> Option<ConfigEntry> {
    let (content, terminator) = split_terminator(raw);
    let captures = CONFIG_LINE.captures(content)?;

    let matched_prefix = captures.get(1)?.as_str();
    let raw_value = captures.get(2)?.as_str();
    let tail = captures.get(3)?.as_str();

    // Only the first `=` delimits the key.
    let key = matched_prefix
        .split('=')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let value = raw_value.trim();
    let (leading, trailing) = if value.is_empty() {
        (raw_value, "")
    } else {
        let start = raw_value.len() - raw_value.trim_start().len();
        let end = start + value.len();
        (&raw_value[..start], &raw_value[end..])
    };

    let mut prefix = String::with_capacity(matched_prefix.len() + leading.len());
    prefix.push_str(matched_prefix);
    prefix.push_str(leading);

    let mut suffix = String::with_capacity(trailing.len() + tail.len() + terminator.len());
    suffix.push_str(trailing);
    suffix.push_str(tail);
    suffix.push_str(terminator);

    Some(ConfigEntry {
        key,
        value: value.to_string(),
        prefix,
        suffix,
        metadata: parse_annotation(tail),
    })
}

/// Split off `\n` or `\r\n`. A bare `\r` is content.
fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(content) = raw.strip_suffix("\r\n") {
        (content, &raw[content.len()..])
    } else if let Some(content) = raw.strip_suffix('\n') {
        (content, &raw[content.len()..])
    } else {
        (raw, "")
    }
}

fn parse_annotation(tail: &str) -> Option<Metadata> {
    let captures = ANNOTATION.captures(tail)?;
    let field = |i: usize| {
        captures
            .get(i)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };
    Some(Metadata {
        value_type: field(1),
        default: field(2),
        description: field(3),
    })
}
