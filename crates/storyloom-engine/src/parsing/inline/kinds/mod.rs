//! # Inline Kinds
//!
//! Inline constructs own their delimiters. The parser and the encoders call
//! these constants; nothing else hardcodes `[[` or `**`.
//!
//! - **`Reference`**: `OPEN = b"[["`, `CLOSE = b"]]"`, `SEP = b':'`
//! - **`Emphasis`**: `***`, `**`, `*`, `__`, `_` in precedence order

pub mod emphasis;
pub mod reference;

pub use emphasis::{Emphasis, EmphasisStyle};
pub use reference::Reference;
