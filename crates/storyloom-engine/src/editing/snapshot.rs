use std::ops::Range;

use xi_rope::Rope;

use crate::editing::Document;
use crate::editing::anchors::anchor_at;
use crate::models::{EntityId, EntitySnapshot};
use crate::parsing::blocks::BlockKind;
use crate::parsing::inline::InlineNode;
use crate::parsing::inline::kinds::EmphasisStyle;
use crate::parsing::rope::slice_to_string;
use crate::parsing::{ParsedDoc, parse_canonical, parse_inline_for_block};

/// Immutable view of the document for rendering.
///
/// Reference labels are resolved against the live directory at snapshot
/// time, so a renamed entity shows its new name even before the canonical
/// text has been refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Document version for change detection
    pub version: u64,
    pub blocks: Vec<RenderBlock>,
}

/// One line of the document prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub kind: BlockKind,
    /// Full byte range of the line in the canonical text
    pub byte_range: Range<usize>,
    /// Content range (excludes markers and line ending)
    pub content_range: Range<usize>,
    pub content: String,
    pub inlines: Vec<RenderInline>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderInline {
    Text(String),
    Reference {
        /// `None` when the token names no known entity.
        entity_id: Option<EntityId>,
        entity_type: String,
        label: String,
        byte_range: Range<usize>,
    },
    Emphasis {
        style: EmphasisStyle,
        children: Vec<RenderInline>,
    },
}

pub(crate) fn create_snapshot(doc: &Document, directory: &EntitySnapshot) -> Snapshot {
    let rope = doc.rope();
    let parsed = if doc.is_opaque() {
        ParsedDoc::opaque(rope)
    } else {
        parse_canonical(rope)
    };

    let blocks = parsed
        .blocks
        .iter()
        .map(|block| {
            let nodes = parse_inline_for_block(rope, block);
            RenderBlock {
                kind: block.kind,
                byte_range: block.span.range(),
                content_range: block.content_span.range(),
                content: slice_to_string(rope, block.content_span),
                inlines: render_inlines(doc, directory, rope, &nodes),
            }
        })
        .collect();

    Snapshot {
        version: doc.version(),
        blocks,
    }
}

fn render_inlines(
    doc: &Document,
    directory: &EntitySnapshot,
    rope: &Rope,
    nodes: &[InlineNode],
) -> Vec<RenderInline> {
    nodes
        .iter()
        .map(|node| match node {
            InlineNode::Text(sp) => RenderInline::Text(slice_to_string(rope, *sp)),
            InlineNode::Reference {
                full,
                entity_type,
                name,
            } => {
                let entity_type = slice_to_string(rope, *entity_type);
                let written = slice_to_string(rope, *name);
                let entity = match anchor_at(doc.anchors(), &full.range()) {
                    Some(anchor) => directory.get(anchor.entity_id),
                    None => directory.find(&entity_type, &written),
                };
                RenderInline::Reference {
                    entity_id: entity.map(|e| e.id),
                    label: entity.map_or(written, |e| e.name.clone()),
                    entity_type,
                    byte_range: full.range(),
                }
            }
            InlineNode::Emphasis {
                style, children, ..
            } => RenderInline::Emphasis {
                style: *style,
                children: render_inlines(doc, directory, rope, children),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use pretty_assertions::assert_eq;

    fn directory() -> EntitySnapshot {
        EntitySnapshot::new(vec![Entity::new(1, "character", "Elara")])
    }

    #[test]
    fn empty_document() {
        let doc = Document::from_canonical("", &directory());
        let snap = doc.snapshot(&directory());
        assert!(snap.blocks.is_empty());
        assert_eq!(snap.version, 0);
    }

    #[test]
    fn heading_content_excludes_marker() {
        let doc = Document::from_canonical("## Arrival\n", &directory());
        let snap = doc.snapshot(&directory());
        assert_eq!(snap.blocks[0].kind, BlockKind::Heading { level: 2 });
        assert_eq!(snap.blocks[0].content, "Arrival");
        assert_eq!(snap.blocks[0].content_range, 3..10);
        assert_eq!(snap.blocks[0].byte_range, 0..11);
    }

    #[test]
    fn label_follows_live_directory() {
        let doc = Document::from_canonical("Meet [[character:Elara]].", &directory());
        let renamed = EntitySnapshot::new(vec![Entity::new(1, "character", "Elara Vance")]);
        let snap = doc.snapshot(&renamed);
        assert_eq!(
            snap.blocks[0].inlines,
            vec![
                RenderInline::Text("Meet ".to_string()),
                RenderInline::Reference {
                    entity_id: Some(EntityId(1)),
                    entity_type: "character".to_string(),
                    label: "Elara Vance".to_string(),
                    byte_range: 5..24,
                },
                RenderInline::Text(".".to_string()),
            ]
        );
        // canonical text is untouched until labels are refreshed
        assert_eq!(doc.canonical(), "Meet [[character:Elara]].");
    }

    #[test]
    fn unknown_reference_keeps_written_name() {
        let doc = Document::from_canonical("[[artifact:Lantern]]", &directory());
        let snap = doc.snapshot(&directory());
        match &snap.blocks[0].inlines[0] {
            RenderInline::Reference {
                entity_id, label, ..
            } => {
                assert_eq!(*entity_id, None);
                assert_eq!(label, "Lantern");
            }
            other => panic!("expected Reference, got {other:?}"),
        }
    }

    #[test]
    fn emphasis_nests_references() {
        let doc = Document::from_canonical("*[[character:Elara]]*", &directory());
        let snap = doc.snapshot(&directory());
        match &snap.blocks[0].inlines[0] {
            RenderInline::Emphasis { style, children } => {
                assert_eq!(*style, EmphasisStyle::Italic);
                assert!(matches!(children[0], RenderInline::Reference { .. }));
            }
            other => panic!("expected Emphasis, got {other:?}"),
        }
    }
}
