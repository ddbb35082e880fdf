//! # Block Parsing
//!
//! Canonical text is line oriented: each line is classified on its own into
//! a heading, list item, rule, blank or paragraph.
//!
//! - **`kinds`**: constructs with owned markers (`Heading`, `Bullet`, `Rule`)
//! - **`classify`**: `LineClassifier` for complete and still-growing lines
//! - **`types`**: `BlockNode` and `BlockKind`

pub mod classify;
pub mod kinds;
pub mod types;

pub use classify::{LineClass, LineClassifier, LineKind};
pub use types::{BlockKind, BlockNode};
