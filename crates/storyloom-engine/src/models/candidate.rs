use crate::editing::FormatCommand;
use crate::models::{EntitySnapshot, ReferenceToken};

/// What committing a candidate does to the document.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateAction {
    Reference(ReferenceToken),
    Command(FormatCommand),
}

/// One selectable menu item. Reference targets and formatting commands share
/// this shape so filtering and keyboard navigation have a single code path.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub label: String,
    /// Category matched alongside the label: the entity type for references,
    /// `style` or `block` for commands.
    pub kind: String,
    /// Position in the source listing; stable key for the host's menu rows.
    pub sort_key: usize,
    pub action: CandidateAction,
}

impl Candidate {
    pub fn is_reference(&self) -> bool {
        matches!(self.action, CandidateAction::Reference(_))
    }

    /// Reference candidates for every entity in the directory.
    ///
    /// Entities whose name or type the canonical grammar cannot encode are
    /// left out rather than producing a token that would not round-trip.
    pub fn references(snapshot: &EntitySnapshot) -> Vec<Candidate> {
        snapshot
            .entities()
            .iter()
            .enumerate()
            .filter_map(|(sort_key, entity)| match ReferenceToken::from_entity(entity) {
                Ok(token) => Some(Candidate {
                    id: entity.id.to_string(),
                    label: entity.name.clone(),
                    kind: entity.entity_type.clone(),
                    sort_key,
                    action: CandidateAction::Reference(token),
                }),
                Err(err) => {
                    log::warn!("skipping entity {} as a reference target: {err}", entity.id);
                    None
                }
            })
            .collect()
    }

    /// The formatting command catalogue offered behind the command trigger.
    pub fn commands() -> Vec<Candidate> {
        FormatCommand::ALL
            .iter()
            .enumerate()
            .map(|(sort_key, command)| Candidate {
                id: command.id().to_string(),
                label: command.title().to_string(),
                kind: command.category().to_string(),
                sort_key,
                action: CandidateAction::Command(*command),
            })
            .collect()
    }
}
