//! # Inline authoring
//!
//! Trigger detection, suggestion filtering and the editor session that ties
//! them to a [`Document`](crate::editing::Document).

pub mod session;
pub mod suggest;
pub mod trigger;

pub use session::{EditorEvent, EditorSession};
pub use suggest::{MenuKey, MenuOutcome, PAGE_SIZE, SuggestionMenu, rank, rank_page, search_additions};
pub use trigger::{TriggerConfig, TriggerKind, TriggerState, scan, scan_line};
