use crate::parsing::rope::span::Span;

use super::kinds::EmphasisStyle;

/// A parsed inline node with byte spans into the canonical text.
///
/// Spans tile the parsed content exactly, so slicing them back out and
/// concatenating reproduces the source byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    /// Plain text that isn't part of any special construct.
    Text(Span),
    /// A reference token `[[type:name]]`.
    Reference {
        /// Full span including `[[` and `]]`.
        full: Span,
        entity_type: Span,
        name: Span,
    },
    /// Emphasis around nested inline content.
    Emphasis {
        /// Full span including both delimiter runs.
        full: Span,
        inner: Span,
        style: EmphasisStyle,
        children: Vec<InlineNode>,
    },
}

impl InlineNode {
    pub fn span(&self) -> Span {
        match self {
            InlineNode::Text(sp) => *sp,
            InlineNode::Reference { full, .. } => *full,
            InlineNode::Emphasis { full, .. } => *full,
        }
    }
}
