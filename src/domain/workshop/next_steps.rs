//! Next steps: pre-sell plan and workshop reflections.
//!
//! The lists are canonical. The newline-joined strings older documents carry
//! (`preSellPlan`, `workshopReflections`) are derived on serialization and only
//! read back when a legacy document has no list form.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NextStepsRecord", into = "NextStepsRecord")]
pub struct NextSteps {
    pub pre_sell_plan_items: Vec<String>,
    pub workshop_reflection_items: Vec<String>,
}

impl NextSteps {
    /// Pre-sell plan as one newline-joined string.
    pub fn pre_sell_plan(&self) -> String {
        self.pre_sell_plan_items.join("\n")
    }

    /// Workshop reflections as one newline-joined string.
    pub fn workshop_reflections(&self) -> String {
        self.workshop_reflection_items.join("\n")
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wire shape: lists plus the derived legacy strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NextStepsRecord {
    pre_sell_plan_items: Option<Vec<String>>,
    workshop_reflection_items: Option<Vec<String>>,
    pre_sell_plan: Option<String>,
    workshop_reflections: Option<String>,
}

impl From<NextStepsRecord> for NextSteps {
    fn from(record: NextStepsRecord) -> Self {
        let pre_sell_plan_items = record
            .pre_sell_plan_items
            .or_else(|| record.pre_sell_plan.as_deref().map(split_lines))
            .unwrap_or_default();
        let workshop_reflection_items = record
            .workshop_reflection_items
            .or_else(|| record.workshop_reflections.as_deref().map(split_lines))
            .unwrap_or_default();
        Self {
            pre_sell_plan_items,
            workshop_reflection_items,
        }
    }
}

impl From<NextSteps> for NextStepsRecord {
    fn from(steps: NextSteps) -> Self {
        Self {
            pre_sell_plan: Some(steps.pre_sell_plan()),
            workshop_reflections: Some(steps.workshop_reflections()),
            pre_sell_plan_items: Some(steps.pre_sell_plan_items),
            workshop_reflection_items: Some(steps.workshop_reflection_items),
        }
    }
}
