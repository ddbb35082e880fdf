use xi_rope::Rope;

use crate::error::{AuthoringError, Result};
use crate::parsing::blocks::BlockNode;

/// Checks that blocks tile the rope in order and that every content span
/// sits inside its block.
pub fn check(rope: &Rope, blocks: &[BlockNode]) -> Result<()> {
    let n = rope.len();
    let mut expected_start = 0;
    for b in blocks {
        if b.span.start != expected_start || b.span.end > n || b.span.start > b.span.end {
            return Err(AuthoringError::Serialization(format!(
                "block span {:?} does not continue at {expected_start} (rope len: {n})",
                b.span
            )));
        }
        if b.content_span.start < b.span.start || b.content_span.end > b.span.end {
            return Err(AuthoringError::Serialization(format!(
                "content span {:?} not contained in block span {:?}",
                b.content_span, b.span
            )));
        }
        expected_start = b.span.end;
    }
    if expected_start != n {
        return Err(AuthoringError::Serialization(format!(
            "blocks end at {expected_start} but rope len is {n}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{blocks::BlockKind, parse_canonical, rope::Span};

    #[test]
    fn parsed_blocks_pass() {
        let rope = Rope::from("# T\n- a\n\n---\ntext");
        let doc = parse_canonical(&rope);
        assert!(check(&rope, &doc.blocks).is_ok());
    }

    #[test]
    fn gap_is_reported() {
        let rope = Rope::from("ab\ncd");
        let blocks = vec![BlockNode {
            kind: BlockKind::Paragraph,
            span: Span::new(0, 2),
            content_span: Span::new(0, 2),
        }];
        assert!(matches!(
            check(&rope, &blocks),
            Err(AuthoringError::Serialization(_))
        ));
    }
}
