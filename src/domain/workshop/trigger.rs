//! Trigger events: moments that push a buyer to look for a solution.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TriggerId;

use super::{Describe, EntrySource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub id: TriggerId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: EntrySource,
}

impl TriggerEvent {
    /// Creates a user-authored trigger with a fresh id.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_id(TriggerId::generate(), description, EntrySource::User)
    }

    pub fn with_id(id: TriggerId, description: impl Into<String>, source: EntrySource) -> Self {
        Self {
            id,
            description: description.into(),
            source,
        }
    }
}

impl Describe for TriggerEvent {
    fn description(&self) -> &str {
        &self.description
    }
}
