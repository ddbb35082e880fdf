//! Async glue between a [`WizardSession`] and a [`Collaborator`].
//!
//! Each function runs one call-issuing transition: it asks the session for
//! the request, awaits the collaborator and hands the answer back. The
//! session stays borrowed for the duration, so only one call per session can
//! be outstanding.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;

use crate::error::{AuthoringError, CallError, Result};
use crate::models::EntityId;
use crate::render::StreamEvent;
use crate::wizard::collaborator::{ChapterRequest, Collaborator};
use crate::wizard::session::{
    CommitRequest, DraftArtifact, DraftRequest, IterateRequest, WizardSession,
};

/// Shared flag that cancels a session from outside.
///
/// Cloned out of the session with [`WizardSession::cancel_handle`] so a host
/// can cancel while a driver function holds the session. The session picks
/// the flag up when the outstanding answer arrives and drops that answer; a
/// running stream also stops between fragments.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Brief -> Context.
pub async fn analyze(session: &mut WizardSession, collab: &dyn Collaborator) -> Result<()> {
    let request = session.begin_analyze()?;
    let result = collab.analyze_brief(&request).await;
    session.finish_analyze(result)
}

/// Context -> Draft: a proposal for bible elements, an outline for chapters.
pub async fn generate(session: &mut WizardSession, collab: &dyn Collaborator) -> Result<()> {
    let request = session.begin_generate()?;
    let result = run_draft(collab, &request).await;
    session.finish_draft(result)
}

/// Regenerates the current artifact with the session's feedback.
pub async fn iterate(session: &mut WizardSession, collab: &dyn Collaborator) -> Result<()> {
    match session.begin_iterate()? {
        IterateRequest::Draft(request) => {
            let result = run_draft(collab, &request).await;
            session.finish_draft(result)
        }
        IterateRequest::Chapter(request) => stream_chapter(session, collab, &request).await,
    }
}

/// Draft -> Review for chapters, streaming the text into the session.
pub async fn write_chapter(session: &mut WizardSession, collab: &dyn Collaborator) -> Result<()> {
    let request = session.begin_write()?;
    stream_chapter(session, collab, &request).await
}

/// Creates a suggested entity and moves it to the relevant list.
pub async fn materialize(
    session: &mut WizardSession,
    collab: &dyn Collaborator,
    name: &str,
) -> Result<()> {
    let request = session.begin_materialize(name)?;
    let result = collab.create_entity(&request).await;
    session.finish_materialize(result)
}

/// Review -> Finished. Returns the id the artifact was stored under.
pub async fn finish(session: &mut WizardSession, collab: &dyn Collaborator) -> Result<EntityId> {
    let result = match session.begin_commit()? {
        CommitRequest::Create(entity) => collab.create_entity(&entity).await,
        CommitRequest::Save { id, content } => collab.save(id, &content).await.map(|()| id),
    };
    session.finish_commit(result)?;
    session
        .committed()
        .ok_or(AuthoringError::InvalidStage(session.stage()))
}

/// Reloads the entity directory for the session's story.
pub async fn refresh_directory(
    session: &mut WizardSession,
    collab: &dyn Collaborator,
) -> Result<()> {
    if session.stage().is_terminal() {
        return Err(AuthoringError::InvalidStage(session.stage()));
    }
    let directory = collab.list_entities(session.story()).await?;
    if session.cancel_handle().is_cancelled() {
        session.cancel();
        return Ok(());
    }
    log::debug!("directory refreshed with {} entities", directory.len());
    session.update_directory(directory);
    Ok(())
}

async fn run_draft(
    collab: &dyn Collaborator,
    request: &DraftRequest,
) -> Result<DraftArtifact, CallError> {
    match request {
        DraftRequest::Proposal(request) => collab
            .propose_element(request)
            .await
            .map(DraftArtifact::Proposal),
        DraftRequest::Outline(request) => collab
            .generate_outline(request)
            .await
            .map(DraftArtifact::Outline),
    }
}

async fn stream_chapter(
    session: &mut WizardSession,
    collab: &dyn Collaborator,
    request: &ChapterRequest,
) -> Result<()> {
    let cancel = session.cancel_handle();
    let mut stream = match collab.write_chapter(request).await {
        Ok(stream) => {
            session.stream_started(Ok(()))?;
            stream
        }
        Err(err) => return session.stream_started(Err(err)),
    };

    loop {
        if cancel.is_cancelled() {
            session.cancel();
            log::debug!("stream abandoned after cancel");
            return Ok(());
        }
        let done = match stream.next().await {
            Some(Ok(event)) => session.stream_event(event)?,
            Some(Err(err)) => return session.stream_failed(err),
            // A stream that stops without `End` is treated as complete.
            None => session.stream_event(StreamEvent::End)?,
        };
        if done {
            return Ok(());
        }
    }
}
