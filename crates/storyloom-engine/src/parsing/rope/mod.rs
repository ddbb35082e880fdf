pub mod lines;
pub mod slice;
pub mod span;

pub use lines::{
    LineRef, floor_boundary, line_before, line_start, lines_with_spans, rope_floor_boundary,
};
pub use slice::slice_to_string;
pub use span::Span;
