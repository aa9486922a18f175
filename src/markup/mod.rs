//! Line-oriented XML dialect.
//!
//! Lines are not parsed into a tree. Each physical line becomes a flat run of
//! [`Segment`]s: literal text and `name="value"` attributes. Comment bodies,
//! including ones spanning several lines, are always literal.

pub mod line;
pub mod parser;

pub use line::{MarkupFile, MarkupLine, Segment};
pub use parser::{parse_markup, tokenize_line, CommentState};
