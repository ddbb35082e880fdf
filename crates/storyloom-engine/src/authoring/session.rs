use crate::authoring::suggest::{MenuKey, MenuOutcome, PAGE_SIZE, SuggestionMenu};
use crate::authoring::trigger::{TriggerConfig, TriggerKind, TriggerState, scan_line};
use crate::editing::{Cmd, Document, Patch, Snapshot};
use crate::error::{AuthoringError, Result};
use crate::models::{Candidate, CandidateAction, EntitySnapshot};
use crate::parsing::rope::line_before;

/// Notifications for the host, drained with [`EditorSession::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    DocumentChanged(Patch),
    TriggerChanged(TriggerState),
}

/// One editor: the document, the entity directory it references, and the
/// trigger/menu state recomputed after every text or cursor change.
#[derive(Debug)]
pub struct EditorSession {
    document: Document,
    directory: EntitySnapshot,
    references: Vec<Candidate>,
    commands: Vec<Candidate>,
    triggers: TriggerConfig,
    page_size: usize,
    trigger: TriggerState,
    menu: Option<SuggestionMenu>,
    /// Anchor of a trigger the user dismissed; it stays closed until the
    /// cursor leaves it.
    dismissed: Option<usize>,
    events: Vec<EditorEvent>,
}

impl EditorSession {
    pub fn new(document: Document, directory: EntitySnapshot) -> Self {
        Self::with_config(document, directory, TriggerConfig::default(), PAGE_SIZE)
    }

    pub fn with_config(
        document: Document,
        directory: EntitySnapshot,
        triggers: TriggerConfig,
        page_size: usize,
    ) -> Self {
        let mut session = Self {
            references: Candidate::references(&directory),
            commands: Candidate::commands(),
            document,
            directory,
            triggers,
            page_size,
            trigger: TriggerState::Inactive,
            menu: None,
            dismissed: None,
            events: Vec::new(),
        };
        session.rescan();
        session.events.clear();
        session
    }

    /// Applies a raw edit and recomputes the trigger.
    pub fn edit(&mut self, cmd: Cmd) -> Patch {
        let patch = self.document.apply(cmd);
        self.events.push(EditorEvent::DocumentChanged(patch.clone()));
        self.rescan();
        patch
    }

    /// Types text at the caret, replacing any selection.
    pub fn type_text(&mut self, text: &str) -> Patch {
        let selection = self.document.selection();
        let cmd = if selection.is_empty() {
            Cmd::InsertText {
                at: selection.start,
                text: text.to_string(),
            }
        } else {
            Cmd::ReplaceRange {
                range: selection,
                text: text.to_string(),
            }
        };
        self.edit(cmd)
    }

    /// Deletes the selection, or the char before the caret.
    pub fn backspace(&mut self) -> Option<Patch> {
        let selection = self.document.selection();
        let range = if selection.is_empty() {
            let prev = self.document.rope().prev_codepoint_offset(selection.start)?;
            prev..selection.start
        } else {
            selection
        };
        Some(self.edit(Cmd::DeleteRange { range }))
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.document.set_selection(offset..offset);
        self.rescan();
    }

    /// Routes a navigation key to the open menu.
    ///
    /// Returns the patch when the key committed a candidate; `Ok(None)` when
    /// no menu is open or the key only moved the selection.
    pub fn key(&mut self, key: MenuKey) -> Result<Option<Patch>> {
        let Some(menu) = self.menu.as_mut() else {
            return Ok(None);
        };
        match menu.key(key) {
            MenuOutcome::Commit(candidate) => self.commit(&candidate).map(Some),
            MenuOutcome::Cancel => {
                if let TriggerState::Active { anchor, .. } = self.trigger {
                    self.dismissed = Some(anchor);
                }
                self.close_trigger();
                Ok(None)
            }
            MenuOutcome::Moved | MenuOutcome::Ignored => Ok(None),
        }
    }

    /// Replaces the active trigger text with the candidate's content in one
    /// document edit and closes the trigger.
    pub fn commit(&mut self, candidate: &Candidate) -> Result<Patch> {
        let range = self
            .trigger
            .replace_range(self.document.cursor())
            .ok_or_else(|| AuthoringError::validation("no active trigger to commit into"))?;
        let cmd = match &candidate.action {
            CandidateAction::Reference(token) => Cmd::InsertReference {
                range,
                token: token.clone(),
            },
            CandidateAction::Command(command) => Cmd::ApplyFormat {
                range,
                command: *command,
            },
        };
        log::info!("committing {} {:?}", candidate.kind, candidate.label);
        let patch = self.document.apply(cmd);
        self.events.push(EditorEvent::DocumentChanged(patch.clone()));
        self.dismissed = None;
        self.close_trigger();
        Ok(patch)
    }

    /// Takes externally stored content unless the editor has focus.
    pub fn sync_external(&mut self, bytes: impl AsRef<[u8]>) -> Option<Patch> {
        let patch = self.document.replace_from_external(bytes, &self.directory)?;
        self.events.push(EditorEvent::DocumentChanged(patch.clone()));
        self.dismissed = None;
        self.rescan();
        Some(patch)
    }

    pub fn focus(&mut self, focused: bool) {
        self.document.set_focused(focused);
        if !focused {
            self.close_trigger();
        }
    }

    /// Swaps in a fresh directory snapshot and rewrites renamed references.
    pub fn update_directory(&mut self, directory: EntitySnapshot) -> Option<Patch> {
        self.references = Candidate::references(&directory);
        self.directory = directory;
        let patch = self.document.refresh_reference_labels(&self.directory);
        if let Some(patch) = &patch {
            self.events.push(EditorEvent::DocumentChanged(patch.clone()));
        }
        self.rescan();
        patch
    }

    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn directory(&self) -> &EntitySnapshot {
        &self.directory
    }

    pub fn trigger(&self) -> &TriggerState {
        &self.trigger
    }

    pub fn menu(&self) -> Option<&SuggestionMenu> {
        self.menu.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.document.snapshot(&self.directory)
    }

    fn source(&self, kind: TriggerKind) -> &[Candidate] {
        match kind {
            TriggerKind::Reference => &self.references,
            TriggerKind::Command => &self.commands,
        }
    }

    fn rescan(&mut self) {
        let mut state = {
            let (base, line) = line_before(self.document.rope(), self.document.cursor());
            scan_line(&line, base, &self.triggers)
        };
        match (&state, self.dismissed) {
            (TriggerState::Active { anchor, .. }, Some(dismissed)) if *anchor == dismissed => {
                state = TriggerState::Inactive;
            }
            _ => self.dismissed = None,
        }

        match &state {
            TriggerState::Active { kind, query, .. } => {
                let kind = *kind;
                let reuse = self.menu.as_ref().is_some_and(|m| m.kind() == kind);
                if reuse {
                    let source = self.source(kind).to_vec();
                    if let Some(menu) = self.menu.as_mut() {
                        menu.refilter(&source, query);
                    }
                } else {
                    self.menu = Some(SuggestionMenu::open(
                        kind,
                        self.source(kind),
                        query,
                        self.page_size,
                    ));
                }
            }
            TriggerState::Inactive => self.menu = None,
        }

        if state != self.trigger {
            log::debug!("trigger {:?} -> {:?}", self.trigger, state);
            self.trigger = state.clone();
            self.events.push(EditorEvent::TriggerChanged(state));
        }
    }

    fn close_trigger(&mut self) {
        self.menu = None;
        if self.trigger.is_active() {
            self.trigger = TriggerState::Inactive;
            self.events.push(EditorEvent::TriggerChanged(TriggerState::Inactive));
        }
    }
}
