//! # Document model and insertion engine
//!
//! - **`document`**: `Document`, the rope-backed canonical text with cursor,
//!   version, focus and reference anchors
//! - **`commands`**: `Cmd` and `FormatCommand`, each lowered to one delta
//! - **`anchors`**: reference anchors carried through edits
//! - **`snapshot`**: immutable render view with live reference labels
//! - **`patch`**: result of one applied command

pub mod anchors;
pub mod commands;
pub mod document;
pub mod patch;
pub mod snapshot;

pub use anchors::{AnchorId, ReferenceAnchor};
pub use commands::{Cmd, FormatCommand};
pub use document::Document;
pub use patch::Patch;
pub use snapshot::{RenderBlock, RenderInline, Snapshot};
