//! Partial updates to the workshop aggregate.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    Idea, Job, NextSteps, Pain, ProblemUp, Reflections, TargetBuyer, TargetMarketProfile,
    TriggerEvent,
};

/// Top-level fields of [`WorkshopData`](super::WorkshopData).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkshopField {
    BigIdea,
    RefinedIdea,
    TriggerEvents,
    Jobs,
    TargetBuyers,
    Pains,
    ProblemUp,
    TargetMarketProfile,
    NextSteps,
    Reflections,
}

impl WorkshopField {
    pub fn all() -> &'static [WorkshopField] {
        &[
            WorkshopField::BigIdea,
            WorkshopField::RefinedIdea,
            WorkshopField::TriggerEvents,
            WorkshopField::Jobs,
            WorkshopField::TargetBuyers,
            WorkshopField::Pains,
            WorkshopField::ProblemUp,
            WorkshopField::TargetMarketProfile,
            WorkshopField::NextSteps,
            WorkshopField::Reflections,
        ]
    }

    /// Field name as it appears in the stored document.
    pub fn wire_name(&self) -> &'static str {
        match self {
            WorkshopField::BigIdea => "bigIdea",
            WorkshopField::RefinedIdea => "refinedIdea",
            WorkshopField::TriggerEvents => "triggerEvents",
            WorkshopField::Jobs => "jobs",
            WorkshopField::TargetBuyers => "targetBuyers",
            WorkshopField::Pains => "pains",
            WorkshopField::ProblemUp => "problemUp",
            WorkshopField::TargetMarketProfile => "targetMarketProfile",
            WorkshopField::NextSteps => "nextSteps",
            WorkshopField::Reflections => "reflections",
        }
    }
}

impl fmt::Display for WorkshopField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A set of whole-field replacements.
///
/// Every field that is `Some` replaces the aggregate's value for that field
/// outright; `None` leaves it untouched. There is no deep merge.
///
/// ```ignore
/// let patch = WorkshopPatch::new()
///     .trigger_events(vec![TriggerEvent::new("Lost a client")])
///     .reflections(Reflections::default());
/// store.update_workshop_data(patch);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkshopPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_idea: Option<Idea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_idea: Option<Idea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_events: Option<Vec<TriggerEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<Job>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_buyers: Option<Vec<TargetBuyer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pains: Option<Vec<Pain>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_up: Option<ProblemUp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_market_profile: Option<TargetMarketProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<NextSteps>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflections: Option<Reflections>,
}

impl WorkshopPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn big_idea(mut self, value: Idea) -> Self {
        self.big_idea = Some(value);
        self
    }

    pub fn refined_idea(mut self, value: Idea) -> Self {
        self.refined_idea = Some(value);
        self
    }

    pub fn trigger_events(mut self, value: Vec<TriggerEvent>) -> Self {
        self.trigger_events = Some(value);
        self
    }

    pub fn jobs(mut self, value: Vec<Job>) -> Self {
        self.jobs = Some(value);
        self
    }

    pub fn target_buyers(mut self, value: Vec<TargetBuyer>) -> Self {
        self.target_buyers = Some(value);
        self
    }

    pub fn pains(mut self, value: Vec<Pain>) -> Self {
        self.pains = Some(value);
        self
    }

    pub fn problem_up(mut self, value: ProblemUp) -> Self {
        self.problem_up = Some(value);
        self
    }

    pub fn target_market_profile(mut self, value: TargetMarketProfile) -> Self {
        self.target_market_profile = Some(value);
        self
    }

    pub fn next_steps(mut self, value: NextSteps) -> Self {
        self.next_steps = Some(value);
        self
    }

    pub fn reflections(mut self, value: Reflections) -> Self {
        self.reflections = Some(value);
        self
    }

    /// Fields this patch replaces, in declaration order.
    pub fn fields(&self) -> Vec<WorkshopField> {
        let present = [
            (WorkshopField::BigIdea, self.big_idea.is_some()),
            (WorkshopField::RefinedIdea, self.refined_idea.is_some()),
            (WorkshopField::TriggerEvents, self.trigger_events.is_some()),
            (WorkshopField::Jobs, self.jobs.is_some()),
            (WorkshopField::TargetBuyers, self.target_buyers.is_some()),
            (WorkshopField::Pains, self.pains.is_some()),
            (WorkshopField::ProblemUp, self.problem_up.is_some()),
            (WorkshopField::TargetMarketProfile, self.target_market_profile.is_some()),
            (WorkshopField::NextSteps, self.next_steps.is_some()),
            (WorkshopField::Reflections, self.reflections.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(field, is_some)| is_some.then_some(field))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}
