use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::CallError;
use crate::models::{EntityId, EntitySnapshot, StoryId};
use crate::render::StreamEvent;
use crate::wizard::context::CuratedContext;

/// Fragments of a streamed generation, ending in `End` or `Error`.
///
/// An `Err` item is a failure of the connection itself rather than an error
/// reported by the collaborator, and also ends the stream.
pub type FragmentStream = BoxStream<'static, Result<StreamEvent, CallError>>;

/// A proposed bible element: name, type and structured field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Field values keyed by field name.
    #[serde(default)]
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefRequest {
    pub story_id: StoryId,
    pub brief: String,
    /// Set for bible elements; chapters have no type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalRequest {
    pub story_id: StoryId,
    pub brief: String,
    pub entity_type: String,
    pub context: CuratedContext,
    pub current: Option<Proposal>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineRequest {
    pub story_id: StoryId,
    pub brief: String,
    pub context: CuratedContext,
    pub current_outline: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterRequest {
    pub story_id: StoryId,
    pub context: CuratedContext,
    pub outline: String,
    pub current_content: Option<String>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntity {
    pub story_id: StoryId,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
    pub content: String,
}

/// The external services the wizard talks to.
///
/// Every call may fail with [`CallError`]; the wizard never retries.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn list_entities(&self, story: StoryId) -> Result<EntitySnapshot, CallError>;

    async fn analyze_brief(&self, request: &BriefRequest) -> Result<CuratedContext, CallError>;

    async fn propose_element(&self, request: &ProposalRequest) -> Result<Proposal, CallError>;

    async fn generate_outline(&self, request: &OutlineRequest) -> Result<String, CallError>;

    /// Starts a streamed chapter. An `Err` means the call never started.
    async fn write_chapter(&self, request: &ChapterRequest) -> Result<FragmentStream, CallError>;

    async fn create_entity(&self, entity: &NewEntity) -> Result<EntityId, CallError>;

    async fn save(&self, id: EntityId, content: &str) -> Result<(), CallError>;
}
