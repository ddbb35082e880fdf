use xi_rope::Rope;

use super::span::Span;

/// Copies the text of a span out of the rope, clamped to the rope's bounds.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    let len = rope.len();
    let start = sp.start.min(len);
    let end = sp.end.min(len).max(start);
    rope.slice_to_cow(start..end).into_owned()
}
