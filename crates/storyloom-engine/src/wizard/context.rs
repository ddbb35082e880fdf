use serde::{Deserialize, Serialize};

/// An entity the analysis thinks the story is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub reason: String,
}

impl SuggestedEntity {
    /// Body written into an entity created from a suggestion.
    pub fn placeholder_content(&self) -> String {
        format!(
            "Placeholder for {}. Reason for creation: {}",
            self.name, self.reason
        )
    }
}

/// Context the writer curates before generation.
///
/// Seeded from the brief analysis and then edited by hand. Relevant entities
/// are referred to by name, as the collaborator expects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedContext {
    #[serde(default)]
    pub relevant_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_so_far: Option<String>,
    #[serde(default)]
    pub suggested_new_elements: Vec<SuggestedEntity>,
}

impl CuratedContext {
    /// Adds a relevant entity. Returns false if it was already listed.
    pub fn add_relevant(&mut self, name: &str) -> bool {
        if self.is_relevant(name) {
            return false;
        }
        self.relevant_elements.push(name.to_string());
        true
    }

    pub fn remove_relevant(&mut self, name: &str) -> bool {
        let before = self.relevant_elements.len();
        self.relevant_elements.retain(|n| n != name);
        self.relevant_elements.len() != before
    }

    pub fn is_relevant(&self, name: &str) -> bool {
        self.relevant_elements.iter().any(|n| n == name)
    }

    pub fn set_story_so_far(&mut self, text: impl Into<String>) {
        self.story_so_far = Some(text.into());
    }

    pub fn suggestion(&self, name: &str) -> Option<&SuggestedEntity> {
        self.suggested_new_elements.iter().find(|s| s.name == name)
    }

    /// Moves a created suggestion over to the relevant list.
    pub(crate) fn promote_suggestion(&mut self, name: &str) {
        self.suggested_new_elements.retain(|s| s.name != name);
        self.add_relevant(name);
    }
}
