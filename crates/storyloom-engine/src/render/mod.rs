//! # Streaming markup
//!
//! Turns generated markdown into escaped HTML-like markup as it arrives.

pub mod markup;
pub mod sse;
pub mod stream;

pub use markup::render_inline;
pub use sse::{SseDecoder, decode_sse_line};
pub use stream::{StreamBuffer, StreamEvent, StreamRenderer, render_markdown};
