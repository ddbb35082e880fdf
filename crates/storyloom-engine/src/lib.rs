//! # storyloom-engine
//!
//! Core of the inline authoring and generation pipeline.
//!
//! - **`authoring`**: trigger scanning, suggestion menus, `EditorSession`
//! - **`editing`**: rope-backed `Document` with canonical `[[type:name]]` tokens
//! - **`parsing`**: line classification and inline parsing of canonical text
//! - **`render`**: incremental markup rendering of streamed text
//! - **`wizard`**: the generation wizard state machine and its collaborator
//! - **`models`**: entities, reference tokens, suggestion candidates

pub mod authoring;
pub mod editing;
pub mod error;
pub mod models;
pub mod parsing;
pub mod render;
pub mod wizard;

// Re-export key types for easier usage
pub use authoring::{EditorEvent, EditorSession, TriggerConfig, TriggerKind, TriggerState};
pub use editing::{Cmd, Document, FormatCommand, Patch, Snapshot};
pub use error::{AuthoringError, CallError, Result};
pub use models::{Candidate, Entity, EntityId, EntitySnapshot, ReferenceToken, StoryId};
pub use render::{StreamEvent, StreamRenderer};
pub use wizard::{Collaborator, Stage, WizardSession};
