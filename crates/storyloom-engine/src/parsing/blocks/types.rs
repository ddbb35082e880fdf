use crate::parsing::rope::span::Span;

/// The kind of a canonical block. One block per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading { level: u8 },
    ListItem { indent: usize },
    Rule,
    Blank,
    Paragraph,
    /// Content that could not be decoded structurally; shown verbatim.
    Opaque,
}

/// A parsed block with its spans into the canonical text.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub kind: BlockKind,
    /// Full byte span of the line including its line ending.
    pub span: Span,
    /// Inline content span (markers and line ending excluded).
    pub content_span: Span,
}

impl BlockNode {
    /// Whether inline parsing applies to this block's content.
    pub fn has_inline(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Heading { .. } | BlockKind::ListItem { .. } | BlockKind::Paragraph
        )
    }
}
