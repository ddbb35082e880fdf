//! # Canonical text parsing
//!
//! Derives the node view of a document from its canonical text. Blocks are
//! one line each; inline content is parsed lazily per block.

pub mod blocks;
pub mod inline;
pub mod invariants;
pub mod rope;

use xi_rope::Rope;

use crate::error::{AuthoringError, Result};
use blocks::{BlockKind, BlockNode, LineClassifier};
use rope::{Span, lines_with_spans, slice::slice_to_string};

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDoc {
    pub blocks: Vec<BlockNode>,
}

impl ParsedDoc {
    /// The whole text as one verbatim block with no tokens.
    pub fn opaque(rope: &Rope) -> Self {
        let all = Span::new(0, rope.len());
        let blocks = if all.is_empty() {
            vec![]
        } else {
            vec![BlockNode {
                kind: BlockKind::Opaque,
                span: all,
                content_span: all,
            }]
        };
        Self { blocks }
    }
}

pub fn parse_canonical(rope: &Rope) -> ParsedDoc {
    let classifier = LineClassifier;
    let blocks = lines_with_spans(rope)
        .map(|lr| {
            let class = classifier.classify(lr.body());
            let kind = match class.kind {
                blocks::LineKind::Rule => BlockKind::Rule,
                blocks::LineKind::Heading { level } => BlockKind::Heading { level },
                blocks::LineKind::ListItem { indent } => BlockKind::ListItem { indent },
                blocks::LineKind::Blank => BlockKind::Blank,
                blocks::LineKind::Paragraph => BlockKind::Paragraph,
            };
            BlockNode {
                kind,
                span: lr.span,
                content_span: Span::new(
                    lr.span.start + class.content.start,
                    lr.span.start + class.content.end,
                ),
            }
        })
        .collect();
    ParsedDoc { blocks }
}

/// Decodes stored canonical bytes.
///
/// Fails with [`AuthoringError::Serialization`] when the bytes are not UTF-8
/// or the parse does not cover the text; callers fall back to
/// [`ParsedDoc::opaque`].
pub fn decode_canonical(bytes: &[u8]) -> Result<(Rope, ParsedDoc)> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AuthoringError::Serialization(format!("invalid UTF-8: {e}")))?;
    let rope = Rope::from(text);
    let parsed = parse_canonical(&rope);
    invariants::check(&rope, &parsed.blocks)?;
    Ok((rope, parsed))
}

/// Inline parse of a block's content. Rules, blanks and opaque blocks have none.
pub fn parse_inline_for_block(rope: &Rope, b: &BlockNode) -> Vec<inline::InlineNode> {
    if !b.has_inline() {
        return vec![];
    }
    let s = slice_to_string(rope, b.content_span);
    inline::parse_inline(b.content_span.start, &s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_block_per_line() {
        let rope = Rope::from("# Title\n- item\n\n---\nSee [[character:Elara]]");
        let kinds: Vec<_> = parse_canonical(&rope).blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading { level: 1 },
                BlockKind::ListItem { indent: 0 },
                BlockKind::Blank,
                BlockKind::Rule,
                BlockKind::Paragraph,
            ]
        );
    }

    #[test]
    fn content_spans_are_absolute() {
        let rope = Rope::from("intro\n## Two\n");
        let doc = parse_canonical(&rope);
        assert_eq!(doc.blocks[1].span, Span::new(6, 13));
        assert_eq!(doc.blocks[1].content_span, Span::new(9, 12));
    }

    #[test]
    fn inline_for_block_finds_reference() {
        let rope = Rope::from("# Hi\nMeet [[character:Elara]] now");
        let doc = parse_canonical(&rope);
        let nodes = parse_inline_for_block(&rope, &doc.blocks[1]);
        let reference = nodes
            .iter()
            .find(|n| matches!(n, inline::InlineNode::Reference { .. }))
            .map(|n| slice_to_string(&rope, n.span()));
        assert_eq!(reference.as_deref(), Some("[[character:Elara]]"));
    }

    #[test]
    fn rule_has_no_inline() {
        let rope = Rope::from("***");
        let doc = parse_canonical(&rope);
        assert!(parse_inline_for_block(&rope, &doc.blocks[0]).is_empty());
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let err = decode_canonical(&[b'o', b'k', 0xFF]).unwrap_err();
        assert!(matches!(err, AuthoringError::Serialization(_)));
    }

    #[test]
    fn opaque_covers_everything() {
        let rope = Rope::from("[[broken\n# x");
        let doc = ParsedDoc::opaque(&rope);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].kind, BlockKind::Opaque);
        assert_eq!(doc.blocks[0].span, Span::new(0, 12));
        assert!(ParsedDoc::opaque(&Rope::from("")).blocks.is_empty());
    }
}
