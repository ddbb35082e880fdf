pub mod candidate;
pub mod entity;
pub mod reference;

pub use candidate::{Candidate, CandidateAction};
pub use entity::{Entity, EntityId, EntitySnapshot, StoryId};
pub use reference::ReferenceToken;
