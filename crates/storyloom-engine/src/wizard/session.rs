use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authoring::suggest::{PAGE_SIZE, search_additions};
use crate::error::{AuthoringError, CallError, Result};
use crate::models::{Entity, EntityId, EntitySnapshot, StoryId};
use crate::render::{StreamEvent, StreamRenderer};
use crate::wizard::collaborator::{
    BriefRequest, ChapterRequest, NewEntity, OutlineRequest, Proposal, ProposalRequest,
};
use crate::wizard::context::{CuratedContext, SuggestedEntity};
use crate::wizard::driver::CancelHandle;

/// Where a wizard session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Brief,
    Context,
    Draft,
    Review,
    Finished,
    Cancelled,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Finished | Stage::Cancelled)
    }
}

/// What the session produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardKind {
    /// A bible element. `existing` is set when editing rather than creating.
    BibleElement {
        entity_type: String,
        existing: Option<EntityId>,
    },
    /// The text of an existing chapter record.
    Chapter { chapter_id: EntityId },
}

/// Notifications for the host, drained with [`WizardSession::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    StageChanged { from: Stage, to: Stage },
    LoadingChanged(bool),
    DraftUpdated,
    Failed(AuthoringError),
}

/// A non-streaming generation request produced by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftRequest {
    Proposal(ProposalRequest),
    Outline(OutlineRequest),
}

/// The result of a [`DraftRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum DraftArtifact {
    Proposal(Proposal),
    Outline(String),
}

/// What iterating asks the collaborator for.
#[derive(Debug, Clone, PartialEq)]
pub enum IterateRequest {
    Draft(DraftRequest),
    Chapter(ChapterRequest),
}

/// How the finished artifact is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitRequest {
    Create(NewEntity),
    Save { id: EntityId, content: String },
}

#[derive(Debug, Clone, PartialEq)]
enum PendingCall {
    Analyze,
    Draft { iterating: bool },
    Write { iterating: bool },
    Materialize(SuggestedEntity),
    Commit,
}

/// State of one run of the generation wizard.
///
/// The session never performs I/O. Every call-issuing action is split into a
/// `begin_*` step that validates and builds the request, and a `finish_*`
/// step that applies the collaborator's answer. Only one call may be in
/// flight; the functions in [`crate::wizard::driver`] tie the two halves
/// together.
#[derive(Debug)]
pub struct WizardSession {
    id: Uuid,
    story: StoryId,
    kind: WizardKind,
    stage: Stage,
    brief: String,
    feedback: String,
    context: CuratedContext,
    directory: EntitySnapshot,
    proposal: Option<Proposal>,
    outline: Option<String>,
    chapter: Option<String>,
    renderer: Option<StreamRenderer>,
    committed: Option<EntityId>,
    in_flight: Option<PendingCall>,
    cancel: CancelHandle,
    events: Vec<WizardEvent>,
}

impl WizardSession {
    fn new(story: StoryId, kind: WizardKind, directory: EntitySnapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            story,
            kind,
            stage: Stage::Brief,
            brief: String::new(),
            feedback: String::new(),
            context: CuratedContext::default(),
            directory,
            proposal: None,
            outline: None,
            chapter: None,
            renderer: None,
            committed: None,
            in_flight: None,
            cancel: CancelHandle::default(),
            events: Vec::new(),
        }
    }

    pub fn new_bible(
        story: StoryId,
        entity_type: impl Into<String>,
        directory: EntitySnapshot,
    ) -> Self {
        let kind = WizardKind::BibleElement {
            entity_type: entity_type.into(),
            existing: None,
        };
        Self::new(story, kind, directory)
    }

    pub fn new_chapter(story: StoryId, chapter_id: EntityId, directory: EntitySnapshot) -> Self {
        Self::new(story, WizardKind::Chapter { chapter_id }, directory)
    }

    /// Opens an existing element straight at Draft.
    ///
    /// `content` is the element's stored JSON. Content that is not valid JSON
    /// is kept as a single string value.
    pub fn edit_existing(
        story: StoryId,
        entity: &Entity,
        content: &str,
        directory: EntitySnapshot,
    ) -> Self {
        let fields = serde_json::from_str(content).unwrap_or_else(|err| {
            log::warn!("stored content of {} is not JSON ({err}), editing as text", entity.id);
            serde_json::Value::String(content.to_string())
        });
        let kind = WizardKind::BibleElement {
            entity_type: entity.entity_type.clone(),
            existing: Some(entity.id),
        };
        let mut session = Self::new(story, kind, directory);
        session.proposal = Some(Proposal {
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
            content: fields,
        });
        session.stage = Stage::Draft;
        session
    }

    // Accessors

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn story(&self) -> StoryId {
        self.story
    }

    pub fn kind(&self) -> &WizardKind {
        &self.kind
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn brief(&self) -> &str {
        &self.brief
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn context(&self) -> &CuratedContext {
        &self.context
    }

    pub fn directory(&self) -> &EntitySnapshot {
        &self.directory
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        self.proposal.as_ref()
    }

    pub fn outline(&self) -> Option<&str> {
        self.outline.as_deref()
    }

    /// Chapter text, including what has streamed in so far.
    pub fn chapter_text(&self) -> Option<&str> {
        match &self.renderer {
            Some(renderer) if self.is_writing() => Some(renderer.text()),
            _ => self.chapter.as_deref(),
        }
    }

    /// Markup for the chapter as it currently stands.
    pub fn chapter_markup(&self) -> Option<String> {
        match &self.renderer {
            Some(renderer) if self.is_writing() => Some(renderer.current_markup()),
            _ => self.chapter.as_deref().map(crate::render::render_markdown),
        }
    }

    pub fn committed(&self) -> Option<EntityId> {
        self.committed
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn take_events(&mut self) -> Vec<WizardEvent> {
        std::mem::take(&mut self.events)
    }

    fn is_writing(&self) -> bool {
        matches!(self.in_flight, Some(PendingCall::Write { .. }))
    }

    fn is_bible(&self) -> bool {
        matches!(self.kind, WizardKind::BibleElement { .. })
    }

    // Local edits

    pub fn set_brief(&mut self, brief: impl Into<String>) -> Result<()> {
        self.require(Stage::Brief)?;
        self.brief = brief.into();
        Ok(())
    }

    /// Changes the type of the element being created. Only before analysis.
    pub fn set_entity_type(&mut self, ty: impl Into<String>) -> Result<()> {
        self.require(Stage::Brief)?;
        match &mut self.kind {
            WizardKind::BibleElement {
                entity_type,
                existing: None,
            } => {
                *entity_type = ty.into();
                Ok(())
            }
            _ => Err(AuthoringError::validation("entity type cannot be changed")),
        }
    }

    /// Not while a call is out: a finished iteration clears the feedback.
    pub fn set_feedback(&mut self, feedback: impl Into<String>) -> Result<()> {
        self.require_live()?;
        self.require_idle()?;
        self.feedback = feedback.into();
        Ok(())
    }

    pub fn add_relevant(&mut self, name: &str) -> Result<bool> {
        self.require(Stage::Context)?;
        if name.trim().is_empty() {
            return Err(AuthoringError::validation("entity name is empty"));
        }
        Ok(self.context.add_relevant(name))
    }

    pub fn remove_relevant(&mut self, name: &str) -> Result<bool> {
        self.require(Stage::Context)?;
        Ok(self.context.remove_relevant(name))
    }

    pub fn set_story_so_far(&mut self, text: impl Into<String>) -> Result<()> {
        self.require(Stage::Context)?;
        self.context.set_story_so_far(text);
        Ok(())
    }

    /// Directory entries matching `term` that are not yet relevant.
    pub fn search_additions(&self, term: &str) -> Vec<Entity> {
        search_additions(
            &self.directory,
            &self.context.relevant_elements,
            term,
            PAGE_SIZE,
        )
    }

    /// Replaces the directory snapshot, e.g. after the host refreshed it.
    pub fn update_directory(&mut self, directory: EntitySnapshot) {
        self.directory = directory;
    }

    /// Hand-edits the proposal. Allowed in any live stage; never transitions.
    pub fn edit_proposal(&mut self, edit: impl FnOnce(&mut Proposal)) -> Result<()> {
        self.require_live()?;
        let proposal = self
            .proposal
            .as_mut()
            .ok_or_else(|| AuthoringError::validation("there is no proposal to edit"))?;
        edit(proposal);
        self.events.push(WizardEvent::DraftUpdated);
        Ok(())
    }

    pub fn set_outline(&mut self, text: impl Into<String>) -> Result<()> {
        self.require_live()?;
        self.require_idle()?;
        self.outline = Some(text.into());
        self.events.push(WizardEvent::DraftUpdated);
        Ok(())
    }

    pub fn set_chapter_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.require(Stage::Review)?;
        self.require_idle()?;
        self.chapter = Some(text.into());
        self.events.push(WizardEvent::DraftUpdated);
        Ok(())
    }

    // Navigation

    /// Steps back one stage, keeping every artifact.
    pub fn back(&mut self) -> Result<()> {
        self.require_idle()?;
        let to = match self.stage {
            Stage::Context => Stage::Brief,
            Stage::Draft => Stage::Context,
            Stage::Review => Stage::Draft,
            other => return Err(AuthoringError::InvalidStage(other)),
        };
        self.transition(to);
        Ok(())
    }

    /// Moves a bible proposal to its read-only preview. No call is made.
    pub fn advance_to_review(&mut self) -> Result<()> {
        self.require(Stage::Draft)?;
        self.require_idle()?;
        if !self.is_bible() {
            return Err(AuthoringError::InvalidStage(self.stage));
        }
        if self.proposal.is_none() {
            return Err(AuthoringError::validation("nothing has been generated yet"));
        }
        self.transition(Stage::Review);
        Ok(())
    }

    /// Discards the session. Answers arriving afterwards are dropped.
    pub fn cancel(&mut self) {
        if self.stage.is_terminal() {
            return;
        }
        self.cancel.cancel();
        if self.in_flight.take().is_some() {
            self.events.push(WizardEvent::LoadingChanged(false));
        }
        self.transition(Stage::Cancelled);
    }

    // Analyze: Brief -> Context

    pub fn begin_analyze(&mut self) -> Result<BriefRequest> {
        self.require(Stage::Brief)?;
        self.require_idle()?;
        if self.brief.trim().is_empty() {
            return Err(AuthoringError::validation("brief is empty"));
        }
        let entity_type = match &self.kind {
            WizardKind::BibleElement { entity_type, .. } => Some(entity_type.clone()),
            WizardKind::Chapter { .. } => None,
        };
        self.start(PendingCall::Analyze);
        Ok(BriefRequest {
            story_id: self.story,
            brief: self.brief.clone(),
            entity_type,
        })
    }

    pub fn finish_analyze(&mut self, result: Result<CuratedContext, CallError>) -> Result<()> {
        self.observe_cancel();
        if !self.settle(PendingCall::Analyze) {
            return Ok(());
        }
        let context = result.map_err(|err| self.failed(err))?;
        log::debug!(
            "analysis found {} relevant and {} suggested entities",
            context.relevant_elements.len(),
            context.suggested_new_elements.len()
        );
        self.context = context;
        self.transition(Stage::Context);
        Ok(())
    }

    // Generate: Context -> Draft

    pub fn begin_generate(&mut self) -> Result<DraftRequest> {
        self.require(Stage::Context)?;
        self.require_idle()?;
        let request = self.draft_request(None)?;
        self.start(PendingCall::Draft { iterating: false });
        Ok(request)
    }

    pub fn finish_draft(&mut self, result: Result<DraftArtifact, CallError>) -> Result<()> {
        self.observe_cancel();
        let iterating = match self.in_flight {
            Some(PendingCall::Draft { iterating }) => iterating,
            _ => {
                self.drop_stale("draft");
                return Ok(());
            }
        };
        self.settle(PendingCall::Draft { iterating });
        let artifact = result.map_err(|err| self.failed(err))?;
        match artifact {
            DraftArtifact::Proposal(proposal) => self.proposal = Some(proposal),
            DraftArtifact::Outline(outline) => self.outline = Some(outline),
        }
        self.events.push(WizardEvent::DraftUpdated);
        if iterating {
            self.feedback.clear();
        } else {
            self.transition(Stage::Draft);
        }
        Ok(())
    }

    // Iterate: Draft -> Draft, Review -> Review

    pub fn begin_iterate(&mut self) -> Result<IterateRequest> {
        if !matches!(self.stage, Stage::Draft | Stage::Review) {
            return Err(AuthoringError::InvalidStage(self.stage));
        }
        self.require_idle()?;
        if self.feedback.trim().is_empty() {
            return Err(AuthoringError::validation("feedback is empty"));
        }
        let feedback = Some(self.feedback.clone());
        if self.stage == Stage::Review && !self.is_bible() {
            let request = self.chapter_request(self.chapter.clone(), feedback)?;
            self.start(PendingCall::Write { iterating: true });
            return Ok(IterateRequest::Chapter(request));
        }
        let request = self.draft_request(feedback)?;
        self.start(PendingCall::Draft { iterating: true });
        Ok(IterateRequest::Draft(request))
    }

    // Write: Draft -> Review (chapter only, streamed)

    pub fn begin_write(&mut self) -> Result<ChapterRequest> {
        self.require(Stage::Draft)?;
        self.require_idle()?;
        if self.is_bible() {
            return Err(AuthoringError::InvalidStage(self.stage));
        }
        let request = self.chapter_request(None, None)?;
        self.start(PendingCall::Write { iterating: false });
        Ok(request)
    }

    /// Records whether the streamed call started. On success the stage
    /// switches to Review and the chapter starts over.
    pub fn stream_started(&mut self, result: Result<(), CallError>) -> Result<()> {
        self.observe_cancel();
        if !self.is_writing() {
            self.drop_stale("stream start");
            return Ok(());
        }
        if let Err(err) = result {
            self.in_flight = None;
            self.events.push(WizardEvent::LoadingChanged(false));
            return Err(self.failed(err));
        }
        self.renderer = Some(StreamRenderer::new());
        self.chapter = Some(String::new());
        self.events.push(WizardEvent::DraftUpdated);
        if self.stage != Stage::Review {
            self.transition(Stage::Review);
        }
        Ok(())
    }

    /// Applies one streamed event. Returns `Ok(true)` once the stream is over
    /// or no longer wanted.
    pub fn stream_event(&mut self, event: StreamEvent) -> Result<bool> {
        self.observe_cancel();
        let Some(PendingCall::Write { iterating }) = self.in_flight else {
            self.drop_stale("stream event");
            return Ok(true);
        };
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(true);
        };
        match renderer.handle(event) {
            Ok(false) => {
                self.events.push(WizardEvent::DraftUpdated);
                Ok(false)
            }
            Ok(true) => {
                self.chapter = Some(renderer.text().to_string());
                self.settle(PendingCall::Write { iterating });
                if iterating {
                    self.feedback.clear();
                }
                self.events.push(WizardEvent::DraftUpdated);
                log::info!("chapter stream finished");
                Ok(true)
            }
            Err(err) => {
                self.chapter = Some(renderer.text().to_string());
                self.settle(PendingCall::Write { iterating });
                self.events.push(WizardEvent::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Ends a stream whose connection failed. Text received so far is kept.
    pub fn stream_failed(&mut self, err: CallError) -> Result<()> {
        self.observe_cancel();
        let Some(PendingCall::Write { iterating }) = self.in_flight else {
            self.drop_stale("stream failure");
            return Ok(());
        };
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.fail(err.to_string());
            self.chapter = Some(renderer.text().to_string());
        }
        self.settle(PendingCall::Write { iterating });
        Err(self.failed(err))
    }

    // Materialize: Context -> Context

    pub fn begin_materialize(&mut self, name: &str) -> Result<NewEntity> {
        self.require(Stage::Context)?;
        self.require_idle()?;
        let suggestion = self
            .context
            .suggestion(name)
            .cloned()
            .ok_or_else(|| AuthoringError::validation(format!("no suggestion named {name}")))?;
        let request = NewEntity {
            story_id: self.story,
            entity_type: suggestion.entity_type.clone(),
            name: suggestion.name.clone(),
            content: suggestion.placeholder_content(),
        };
        self.start(PendingCall::Materialize(suggestion));
        Ok(request)
    }

    /// Applies the created entity: it leaves the suggestions, joins the
    /// relevant list and the local directory snapshot.
    pub fn finish_materialize(&mut self, result: Result<EntityId, CallError>) -> Result<()> {
        self.observe_cancel();
        let Some(PendingCall::Materialize(suggestion)) = self.in_flight.clone() else {
            self.drop_stale("materialize");
            return Ok(());
        };
        self.settle(PendingCall::Materialize(suggestion.clone()));
        let id = result.map_err(|err| self.failed(err))?;
        log::info!("materialized {} as {id}", suggestion.name);
        self.context.promote_suggestion(&suggestion.name);
        self.directory = self.directory.with_entity(Entity {
            id,
            entity_type: suggestion.entity_type,
            name: suggestion.name,
        });
        Ok(())
    }

    // Finish: Review -> Finished

    pub fn begin_commit(&mut self) -> Result<CommitRequest> {
        self.require(Stage::Review)?;
        self.require_idle()?;
        let request = match &self.kind {
            WizardKind::BibleElement { existing, .. } => {
                let proposal = self
                    .proposal
                    .as_ref()
                    .ok_or_else(|| AuthoringError::validation("nothing to commit"))?;
                if proposal.name.trim().is_empty() {
                    return Err(AuthoringError::validation("element name is empty"));
                }
                let content = serde_json::to_string(&proposal.content)
                    .map_err(|err| AuthoringError::Serialization(err.to_string()))?;
                match existing {
                    Some(id) => CommitRequest::Save { id: *id, content },
                    None => CommitRequest::Create(NewEntity {
                        story_id: self.story,
                        entity_type: proposal.entity_type.clone(),
                        name: proposal.name.clone(),
                        content,
                    }),
                }
            }
            WizardKind::Chapter { chapter_id } => {
                let content = self
                    .chapter
                    .clone()
                    .filter(|text| !text.trim().is_empty())
                    .ok_or_else(|| AuthoringError::validation("chapter is empty"))?;
                CommitRequest::Save {
                    id: *chapter_id,
                    content,
                }
            }
        };
        self.start(PendingCall::Commit);
        Ok(request)
    }

    /// `result` carries the id the artifact was stored under.
    pub fn finish_commit(&mut self, result: Result<EntityId, CallError>) -> Result<()> {
        self.observe_cancel();
        if !self.settle(PendingCall::Commit) {
            return Ok(());
        }
        let id = result.map_err(|err| self.failed(err))?;
        self.committed = Some(id);
        self.transition(Stage::Finished);
        Ok(())
    }

    // Internals

    fn draft_request(&self, feedback: Option<String>) -> Result<DraftRequest> {
        Ok(match &self.kind {
            WizardKind::BibleElement { entity_type, .. } => {
                DraftRequest::Proposal(ProposalRequest {
                    story_id: self.story,
                    brief: self.brief.clone(),
                    entity_type: entity_type.clone(),
                    context: self.context.clone(),
                    current: feedback.as_ref().and(self.proposal.clone()),
                    feedback,
                })
            }
            WizardKind::Chapter { .. } => DraftRequest::Outline(OutlineRequest {
                story_id: self.story,
                brief: self.brief.clone(),
                context: self.context.clone(),
                current_outline: feedback.as_ref().and(self.outline.clone()),
                feedback,
            }),
        })
    }

    fn chapter_request(
        &self,
        current_content: Option<String>,
        feedback: Option<String>,
    ) -> Result<ChapterRequest> {
        let outline = self
            .outline
            .clone()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AuthoringError::validation("outline is empty"))?;
        Ok(ChapterRequest {
            story_id: self.story,
            context: self.context.clone(),
            outline,
            current_content,
            feedback,
        })
    }

    fn require(&self, stage: Stage) -> Result<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(AuthoringError::InvalidStage(self.stage))
        }
    }

    fn require_live(&self) -> Result<()> {
        if self.stage.is_terminal() {
            Err(AuthoringError::InvalidStage(self.stage))
        } else {
            Ok(())
        }
    }

    fn require_idle(&mut self) -> Result<()> {
        self.observe_cancel();
        self.require_live()?;
        if self.in_flight.is_some() {
            Err(AuthoringError::Busy)
        } else {
            Ok(())
        }
    }

    /// Applies a cancel made through the handle.
    fn observe_cancel(&mut self) {
        if self.cancel.is_cancelled() && !self.stage.is_terminal() {
            log::debug!("cancel handle fired in {:?}", self.stage);
            self.cancel();
        }
    }

    fn start(&mut self, call: PendingCall) {
        log::debug!("starting {call:?} in {:?}", self.stage);
        self.in_flight = Some(call);
        self.events.push(WizardEvent::LoadingChanged(true));
    }

    /// Clears the pending call if it is `call`. False means the answer is stale.
    fn settle(&mut self, call: PendingCall) -> bool {
        if self.in_flight.as_ref() != Some(&call) {
            self.drop_stale("answer");
            return false;
        }
        self.in_flight = None;
        self.events.push(WizardEvent::LoadingChanged(false));
        true
    }

    fn drop_stale(&self, what: &str) {
        log::debug!("ignoring {what} in {:?} with no matching call", self.stage);
    }

    fn failed(&mut self, err: CallError) -> AuthoringError {
        let err = AuthoringError::from(err);
        log::warn!("call failed in {:?}: {err}", self.stage);
        self.events.push(WizardEvent::Failed(err.clone()));
        err
    }

    fn transition(&mut self, to: Stage) {
        let from = self.stage;
        self.stage = to;
        log::info!("wizard {} moved from {from:?} to {to:?}", self.id);
        self.events.push(WizardEvent::StageChanged { from, to });
    }
}
