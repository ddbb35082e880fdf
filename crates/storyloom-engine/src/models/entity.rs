use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a bible entity or chapter by the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Story every wizard request is scoped to. Passed explicitly, never ambient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub i64);

/// One entry of the entity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub name: String,
}

impl Entity {
    pub fn new(id: i64, entity_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            entity_type: entity_type.into(),
            name: name.into(),
        }
    }
}

/// Read-only snapshot of the entity directory.
///
/// Refreshed wholesale by the host; the engine never edits it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySnapshot {
    entities: Vec<Entity>,
}

impl EntitySnapshot {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Parses a JSON array of `{id, type, name}` records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Resolves a canonical `type:name` pair. Type comparison ignores case
    /// because writers type `Character` as often as `character`.
    pub fn find(&self, entity_type: &str, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.name == name && e.entity_type.eq_ignore_ascii_case(entity_type))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// A new snapshot that also lists `entity`, replacing any entry with its id.
    pub fn with_entity(&self, entity: Entity) -> Self {
        let mut entities: Vec<_> = self
            .entities
            .iter()
            .filter(|e| e.id != entity.id)
            .cloned()
            .collect();
        entities.push(entity);
        Self { entities }
    }
}
