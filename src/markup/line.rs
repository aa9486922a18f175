use serde::Serialize;
use std::fmt;

/// A contiguous span of one markup line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Bytes emitted verbatim.
    Literal { content: String },
    /// A double-quoted `name="value"` attribute.
    Attribute { name: String, value: String },
}

impl Segment {
    pub fn literal(content: impl Into<String>) -> Self {
        Segment::Literal {
            content: content.into(),
        }
    }

    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Segment::Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Segment::Literal { content } => out.push_str(content),
            // Always double quotes; other quoting never tokenizes as an attribute.
            Segment::Attribute { name, value } => {
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
        }
    }
}

/// One physical line of a markup file, terminator included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkupLine {
    pub(crate) index: usize,
    /// Leading space/tab bytes.
    pub(crate) depth: usize,
    /// First `<name` or `</name` on the line. Descriptive only.
    pub(crate) tag_name: Option<String>,
    pub(crate) segments: Vec<Segment>,
}

impl MarkupLine {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Attributes on this line in source order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Attribute { name, value } => Some((name.as_str(), value.as_str())),
            Segment::Literal { .. } => None,
        })
    }

    /// Value of the first attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| value)
    }

    /// Set every attribute called `name` on this line.
    ///
    /// Returns `false` when no attribute has that name; the line is unchanged.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let mut found = false;
        for segment in &mut self.segments {
            if let Segment::Attribute {
                name: attr,
                value: current,
            } = segment
            {
                if *attr == name {
                    *current = value.to_string();
                    found = true;
                }
            }
        }
        found
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) {
        for segment in &self.segments {
            segment.write_to(out);
        }
    }
}

/// A parsed markup file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkupFile {
    lines: Vec<MarkupLine>,
}

impl MarkupFile {
    pub(crate) fn from_lines(lines: Vec<MarkupLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[MarkupLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&MarkupLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Set attribute `name` on line `index`. Unknown lines or names are ignored.
    pub fn set_attribute(&mut self, index: usize, name: &str, value: &str) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => line.set_attribute(name, value),
            None => false,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            line.write_to(&mut out);
        }
        out
    }
}

impl fmt::Display for MarkupFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
