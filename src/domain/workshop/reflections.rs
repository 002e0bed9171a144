//! Closing reflections. Free text only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reflections {
    pub key_insights: String,
    pub next_steps: String,
    pub personal_reflection: String,
}
