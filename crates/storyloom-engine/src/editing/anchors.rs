use std::ops::Range;

use xi_rope::delta::Transformer;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::models::{EntityId, EntitySnapshot};
use crate::parsing::inline::InlineNode;
use crate::parsing::rope::{Span, slice_to_string};
use crate::parsing::{ParsedDoc, parse_inline_for_block};

/// Stable identifier for a reference anchor within one document.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

/// Binds a span of canonical text to the entity it was resolved to.
///
/// The range is carried through every edit; the entity id never changes, so
/// a later rename of the entity does not re-point the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceAnchor {
    pub id: AnchorId,
    /// Byte range of the full `[[type:name]]` token.
    pub range: Range<usize>,
    pub entity_id: EntityId,
    /// Exact canonical text the anchor was created over.
    pub token_text: String,
}

/// Transform anchors through a delta already applied to `rope`.
///
/// An insertion exactly at an anchor's start pushes it forward, one exactly at
/// its end leaves it alone. Anchors whose text no longer spells the token they
/// were created for have been edited into something else and are dropped.
pub(crate) fn transform_anchors(
    anchors: &mut Vec<ReferenceAnchor>,
    delta: &Delta<RopeInfo>,
    rope: &Rope,
) {
    let mut transformer = Transformer::new(delta);
    for anchor in anchors.iter_mut() {
        let start = transformer.transform(anchor.range.start, true);
        let end = transformer.transform(anchor.range.end, false);
        anchor.range = start..end.max(start);
    }

    anchors.retain(|anchor| {
        let intact = anchor.range.end <= rope.len()
            && slice_to_string(rope, Span::from(anchor.range.clone())) == anchor.token_text;
        if !intact {
            log::debug!("dropping reference anchor {:?}: token was edited", anchor.id);
        }
        intact
    });
}

/// Creates anchors for every reference token in `parsed` whose `(type, name)`
/// resolves in the directory. Unresolved tokens stay plain canonical text.
pub(crate) fn resolve_anchors(
    rope: &Rope,
    parsed: &ParsedDoc,
    directory: &EntitySnapshot,
    next_id: &mut u64,
) -> Vec<ReferenceAnchor> {
    let mut anchors = Vec::new();
    for block in &parsed.blocks {
        let mut stack = parse_inline_for_block(rope, block);
        while let Some(node) = stack.pop() {
            match node {
                InlineNode::Reference {
                    full,
                    entity_type,
                    name,
                } => {
                    let ty = slice_to_string(rope, entity_type);
                    let nm = slice_to_string(rope, name);
                    match directory.find(&ty, &nm) {
                        Some(entity) => {
                            *next_id += 1;
                            anchors.push(ReferenceAnchor {
                                id: AnchorId(*next_id),
                                range: full.range(),
                                entity_id: entity.id,
                                token_text: slice_to_string(rope, full),
                            });
                        }
                        None => log::debug!("reference [[{ty}:{nm}]] does not resolve"),
                    }
                }
                InlineNode::Emphasis { children, .. } => stack.extend(children),
                InlineNode::Text(_) => {}
            }
        }
    }
    anchors.sort_by_key(|a| a.range.start);
    anchors
}

/// Anchor covering exactly `range`, if any.
pub(crate) fn anchor_at<'a>(
    anchors: &'a [ReferenceAnchor],
    range: &Range<usize>,
) -> Option<&'a ReferenceAnchor> {
    anchors.iter().find(|a| a.range == *range)
}
