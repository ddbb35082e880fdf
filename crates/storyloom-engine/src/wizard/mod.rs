//! # Generation Wizard
//!
//! Turns a short brief into a reviewed artifact: a bible element proposal
//! or a chapter.
//!
//! - **`session`**: `WizardSession` state machine, no I/O
//! - **`collaborator`**: the `Collaborator` trait and its wire types
//! - **`context`**: curated context seeded by brief analysis
//! - **`driver`**: async functions running one transition each, `CancelHandle`

pub mod collaborator;
pub mod context;
pub mod driver;
pub mod session;

pub use collaborator::{
    BriefRequest, ChapterRequest, Collaborator, FragmentStream, NewEntity, OutlineRequest,
    Proposal, ProposalRequest,
};
pub use context::{CuratedContext, SuggestedEntity};
pub use driver::CancelHandle;
pub use session::{
    CommitRequest, DraftArtifact, DraftRequest, IterateRequest, Stage, WizardEvent, WizardKind,
    WizardSession,
};
