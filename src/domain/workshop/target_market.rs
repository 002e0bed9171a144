//! Target market profile. Free text, no cross-references.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetMarketProfile {
    pub name: String,
    pub common_traits: Vec<String>,
    pub common_triggers: Vec<String>,
    pub core_transformation: String,
}

impl TargetMarketProfile {
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.common_traits.is_empty()
            && self.common_triggers.is_empty()
            && self.core_transformation.trim().is_empty()
    }
}
