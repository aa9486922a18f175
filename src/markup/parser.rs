//! Line tokenizer for the markup dialect.
//!
//! Comments may span lines, so each line scan takes the [`CommentState`] left
//! by the previous line and returns the state for the next one. Nothing is
//! shared between calls to [`parse_markup`].

use super::line::{MarkupFile, MarkupLine, Segment};
use regex::Regex;
use std::sync::LazyLock;

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z0-9_]+)="([^"]*)""#).expect("valid attribute regex"));

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?([A-Za-z0-9_]+)").expect("valid tag regex"));

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Whether the scan is inside an unterminated `<!-- ... -->` comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentState {
    #[default]
    Outside,
    Inside,
}

/// Parse markup text into lines. Never fails.
pub fn parse_markup(text: &str) -> MarkupFile {
    let mut state = CommentState::Outside;
    let mut lines = Vec::new();
    for (index, raw) in text.split_inclusive('\n').enumerate() {
        let (line, next) = tokenize_line(raw, index, state);
        lines.push(line);
        state = next;
    }
    MarkupFile::from_lines(lines)
}

/// Tokenize one physical line starting in `state`.
///
/// Returns the line and the comment state the next line starts in.
pub fn tokenize_line(raw: &str, index: usize, state: CommentState) -> (MarkupLine, CommentState) {
    let trimmed_left = raw.trim_start_matches([' ', '\t']);
    let depth = raw.len() - trimmed_left.len();
    let tag_name = TAG_NAME
        .captures(trimmed_left)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string());

    let mut segments = Vec::new();
    let mut state = state;
    let mut rest = raw;

    while !rest.is_empty() {
        match state {
            CommentState::Inside => match rest.find(COMMENT_CLOSE) {
                None => {
                    segments.push(Segment::literal(rest));
                    rest = "";
                }
                Some(pos) => {
                    let end = pos + COMMENT_CLOSE.len();
                    segments.push(Segment::literal(&rest[..end]));
                    rest = &rest[end..];
                    state = CommentState::Outside;
                }
            },
            CommentState::Outside => match rest.find(COMMENT_OPEN) {
                None => {
                    tokenize_attributes(rest, &mut segments);
                    rest = "";
                }
                Some(pos) => {
                    if pos > 0 {
                        tokenize_attributes(&rest[..pos], &mut segments);
                    }
                    // The opening marker is picked up by the comment branch.
                    rest = &rest[pos..];
                    state = CommentState::Inside;
                }
            },
        }
    }

    let line = MarkupLine {
        index,
        depth,
        tag_name,
        segments,
    };
    (line, state)
}

/// Split `span` into literal gaps and `name="value"` attributes.
fn tokenize_attributes(span: &str, segments: &mut Vec<Segment>) {
    let mut last = 0;
    for captures in ATTRIBUTE.captures_iter(span) {
        let (Some(whole), Some(name), Some(value)) =
            (captures.get(0), captures.get(1), captures.get(2))
        else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::literal(&span[last..whole.start()]));
        }
        segments.push(Segment::attribute(name.as_str(), value.as_str()));
        last = whole.end();
    }
    if last < span.len() {
        segments.push(Segment::literal(&span[last..]));
    }
}
