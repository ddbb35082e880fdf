use super::kinds::{Bullet, Heading, Rule};

/// The structural type of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Rule,
    Heading { level: u8 },
    ListItem { indent: usize },
    Blank,
    Paragraph,
}

/// Classification of one line, with its content range relative to the line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClass {
    pub kind: LineKind,
    /// Byte range of the inline content (markers and line ending excluded).
    pub content: std::ops::Range<usize>,
}

/// Classifies lines independently of their neighbours.
///
/// Shared by the canonical document parser and the streaming renderer so a
/// line means the same thing in storage and on screen.
pub struct LineClassifier;

impl LineClassifier {
    /// Classifies a complete line. `line` must not contain `\n`; a trailing
    /// `\r` is treated as part of the line ending.
    ///
    /// Rules apply in order: rule, heading, list item, blank, paragraph.
    pub fn classify(&self, line: &str) -> LineClass {
        let body = line.strip_suffix('\r').unwrap_or(line);
        let end = body.len();

        if Rule::matches(body) {
            return LineClass {
                kind: LineKind::Rule,
                content: end..end,
            };
        }
        if let Some((level, offset)) = Heading::parse(body) {
            return LineClass {
                kind: LineKind::Heading { level },
                content: offset..end,
            };
        }
        if let Some((indent, offset)) = Bullet::parse(body) {
            return LineClass {
                kind: LineKind::ListItem { indent },
                content: offset..end,
            };
        }
        if body.trim().is_empty() {
            return LineClass {
                kind: LineKind::Blank,
                content: end..end,
            };
        }
        LineClass {
            kind: LineKind::Paragraph,
            content: 0..end,
        }
    }

    /// Classifies a line that may still grow. Returns `None` while more input
    /// could change the line's kind (`#`, `-`, `**`, leading whitespace only).
    pub fn classify_partial(&self, line: &str) -> Option<LineClass> {
        if line.trim().is_empty()
            || Rule::is_pending(line)
            || Heading::is_pending(line)
            || Bullet::is_pending(line)
        {
            return None;
        }
        Some(self.classify(line))
    }
}
