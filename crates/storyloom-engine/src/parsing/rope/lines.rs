use std::borrow::Cow;

use xi_rope::Rope;

use super::span::Span;

/// A single line of the rope with its byte span.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// Byte span of this line (includes the newline if present).
    pub span: Span,
    pub text: String,
}

impl LineRef {
    /// The line without its `\n`.
    pub fn body(&self) -> &str {
        self.text.strip_suffix('\n').unwrap_or(&self.text)
    }
}

/// Iterates lines with their byte spans, newline characters preserved so the
/// spans tile the rope.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        LineRef {
            span: Span { start, end: offset },
            text: line.into_owned(),
        }
    })
}

/// Byte offset where the line containing `offset` starts.
pub fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Largest char boundary of the rope not after `offset`, clamped to its length.
pub fn rope_floor_boundary(rope: &Rope, offset: usize) -> usize {
    let offset = offset.min(rope.len());
    rope.at_or_prev_codepoint_boundary(offset).unwrap_or(0)
}

/// The line containing `offset`, cut at `offset`, and the byte offset it
/// starts at. Only that line is copied out of the rope.
pub fn line_before(rope: &Rope, offset: usize) -> (usize, Cow<'_, str>) {
    let offset = rope_floor_boundary(rope, offset);
    let start = rope.offset_of_line(rope.line_of_offset(offset));
    (start, rope.slice_to_cow(start..offset))
}

/// Largest char boundary not after `offset`, clamped to the text length.
pub fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut at = offset.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_tile_rope() {
        let rope = Rope::from("# Title\nbody\n\nlast");
        let lines: Vec<_> = lines_with_spans(&rope).collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].span, Span::new(0, 8));
        assert_eq!(lines[0].body(), "# Title");
        assert_eq!(lines[2].body(), "");
        assert_eq!(lines[3].span, Span::new(14, 18));
    }

    #[test]
    fn line_bounds() {
        let text = "one\ntwo three\nfour";
        assert_eq!(line_start(text, 6), 4);
        assert_eq!(line_start(text, 0), 0);
        assert_eq!(line_start(text, 15), 14);
    }

    #[test]
    fn line_before_cuts_current_line() {
        let rope = Rope::from("one\ntwo three\nfour");
        let (start, line) = line_before(&rope, 8);
        assert_eq!((start, line.as_ref()), (4, "two "));
        let (start, line) = line_before(&rope, 14);
        assert_eq!((start, line.as_ref()), (14, ""));
        let (start, line) = line_before(&rope, 99);
        assert_eq!((start, line.as_ref()), (14, "four"));
    }

    #[test]
    fn rope_boundary_steps_back_inside_multibyte() {
        let rope = Rope::from("Zoë");
        assert_eq!(rope_floor_boundary(&rope, 3), 2);
        assert_eq!(rope_floor_boundary(&rope, 9), 4);
        assert_eq!(rope_floor_boundary(&Rope::from(""), 0), 0);
    }

    #[test]
    fn floor_boundary_steps_back_inside_multibyte() {
        let text = "Zoë";
        assert_eq!(floor_boundary(text, 3), 2);
        assert_eq!(floor_boundary(text, 4), 4);
        assert_eq!(floor_boundary(text, 99), 4);
    }
}
