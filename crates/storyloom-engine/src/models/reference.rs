use serde::{Deserialize, Serialize};

use crate::error::{AuthoringError, Result};
use crate::models::{Entity, EntityId};
use crate::parsing::inline::kinds::Reference;

/// Structured pointer from authored text to a bible entity.
///
/// The id is fixed at insertion time. The label is what gets written into
/// the canonical form; renders resolve the live name through the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceToken {
    entity_id: EntityId,
    entity_type: String,
    display_label: String,
}

impl ReferenceToken {
    /// Builds a token, rejecting type/name pairs the canonical grammar cannot carry.
    pub fn new(
        entity_id: EntityId,
        entity_type: impl Into<String>,
        display_label: impl Into<String>,
    ) -> Result<Self> {
        let entity_type = entity_type.into();
        let display_label = display_label.into();
        if !Reference::is_valid_type(&entity_type) {
            return Err(AuthoringError::Serialization(format!(
                "entity type {entity_type:?} cannot appear in a reference"
            )));
        }
        if !Reference::is_valid_name(&display_label) {
            return Err(AuthoringError::Serialization(format!(
                "entity name {display_label:?} cannot appear in a reference"
            )));
        }
        Ok(Self {
            entity_id,
            entity_type,
            display_label,
        })
    }

    pub fn from_entity(entity: &Entity) -> Result<Self> {
        Self::new(entity.id, entity.entity_type.clone(), entity.name.clone())
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }

    /// `[[type:name]]`
    pub fn canonical(&self) -> String {
        Reference::encode(&self.entity_type, &self.display_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form() {
        let token = ReferenceToken::new(EntityId(1), "character", "Elara").unwrap();
        assert_eq!(token.canonical(), "[[character:Elara]]");
    }

    #[test]
    fn rejects_unencodable_names() {
        assert!(ReferenceToken::new(EntityId(1), "character", "Ela]]ra").is_err());
        assert!(ReferenceToken::new(EntityId(1), "char:acter", "Elara").is_err());
        assert!(ReferenceToken::new(EntityId(1), "character", "").is_err());
        assert!(ReferenceToken::new(EntityId(1), "character", "two\nlines").is_err());
    }

    #[test]
    fn names_may_contain_spaces_and_colons() {
        let token = ReferenceToken::new(EntityId(4), "location", "Gate: North").unwrap();
        assert_eq!(token.canonical(), "[[location:Gate: North]]");
    }
}
