//! Big idea and refined idea.

use serde::{Deserialize, Serialize};

/// Distinguishes the first-pass idea from the one rewritten after the problem-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaVersion {
    #[default]
    Initial,
    Refined,
}

/// A one-paragraph statement of the business idea and who it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Idea {
    pub description: String,
    pub target_customers: String,
    pub version: IdeaVersion,
}

impl Idea {
    /// Empty idea tagged as the initial version.
    pub fn initial() -> Self {
        Self {
            version: IdeaVersion::Initial,
            ..Default::default()
        }
    }

    /// Empty idea tagged as the refined version.
    pub fn refined() -> Self {
        Self {
            version: IdeaVersion::Refined,
            ..Default::default()
        }
    }

    /// Returns a refined copy of this idea, keeping its text as a starting point.
    pub fn to_refined(&self) -> Self {
        Self {
            version: IdeaVersion::Refined,
            ..self.clone()
        }
    }

    /// True when neither text field has content.
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty() && self.target_customers.trim().is_empty()
    }
}
