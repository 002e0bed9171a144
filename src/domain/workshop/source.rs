//! Origin of a list entry.

use serde::{Deserialize, Serialize};

/// Who authored an entry: the participant or the brainstorming assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    #[default]
    User,
    Assistant,
}

impl EntrySource {
    pub fn is_assistant(&self) -> bool {
        matches!(self, EntrySource::Assistant)
    }
}
