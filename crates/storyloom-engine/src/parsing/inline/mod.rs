//! # Inline Parsing
//!
//! Cursor-based parsing of a block's content into text runs, reference
//! tokens and emphasis.
//!
//! ## Modules
//!
//! - **`types`**: `InlineNode` enum (Text, Reference, Emphasis)
//! - **`kinds`**: constructs with owned delimiters (`Reference`, `Emphasis`)
//! - **`cursor`**: `Cursor` for byte-by-byte parsing with absolute positions
//! - **`parser`**: `parse_inline()` entry point with `try_parse_*` helpers

pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::parse_inline;
pub use types::InlineNode;
