//! Problem-up: the focused problem statement built from earlier steps.
//!
//! Holds opaque ids into the pain, buyer and trigger lists. Nothing enforces
//! that those ids resolve; readers go through the lookup functions on
//! [`WorkshopData`](super::WorkshopData), which report dangling ids as
//! missing instead of failing.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BuyerId, PainId, TriggerId};

use super::WorkshopError;

/// Maximum number of pains the problem-up can focus on.
pub const MAX_SELECTED_PAINS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemUp {
    pub selected_pains: Vec<PainId>,
    pub selected_buyers: Vec<BuyerId>,
    pub relevant_trigger_ids: Vec<TriggerId>,
    pub target_moment: String,
    pub notes: String,
}

impl ProblemUp {
    /// Adds a pain to the selection, rejecting a sixth.
    ///
    /// Selecting an already-selected pain is a no-op.
    pub fn select_pain(&mut self, id: PainId) -> Result<(), WorkshopError> {
        if self.selected_pains.contains(&id) {
            return Ok(());
        }
        if self.selected_pains.len() >= MAX_SELECTED_PAINS {
            return Err(WorkshopError::PainSelectionFull {
                max: MAX_SELECTED_PAINS,
            });
        }
        self.selected_pains.push(id);
        Ok(())
    }

    /// Removes a pain from the selection. Returns true if it was selected.
    pub fn deselect_pain(&mut self, id: &PainId) -> bool {
        let before = self.selected_pains.len();
        self.selected_pains.retain(|p| p != id);
        before != self.selected_pains.len()
    }

    /// Adds the buyer if absent, removes it if present.
    pub fn toggle_buyer(&mut self, id: BuyerId) {
        toggle(&mut self.selected_buyers, id);
    }

    /// Adds the trigger if absent, removes it if present.
    pub fn toggle_trigger(&mut self, id: TriggerId) {
        toggle(&mut self.relevant_trigger_ids, id);
    }

    /// Drops selected pains past the cap. Returns how many were dropped.
    pub(crate) fn truncate_selected_pains(&mut self) -> usize {
        let excess = self.selected_pains.len().saturating_sub(MAX_SELECTED_PAINS);
        self.selected_pains.truncate(MAX_SELECTED_PAINS);
        excess
    }
}

fn toggle<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if let Some(pos) = list.iter().position(|x| x == &item) {
        list.remove(pos);
    } else {
        list.push(item);
    }
}
