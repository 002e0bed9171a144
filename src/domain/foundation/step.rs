//! WorkshopStep enum representing the ten workshop stages.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// The ten sequential workshop stages, numbered 1-10.
///
/// Serialized as the step number so the remote record stores a plain integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum WorkshopStep {
    #[default]
    BigIdea = 1,
    TriggerEvents = 2,
    Jobs = 3,
    TargetBuyers = 4,
    Pains = 5,
    ProblemUp = 6,
    RefinedIdea = 7,
    TargetMarket = 8,
    NextSteps = 9,
    Reflections = 10,
}

impl WorkshopStep {
    /// Number of the first step.
    pub const FIRST: u8 = 1;

    /// Number of the last step.
    pub const LAST: u8 = 10;

    /// Returns all steps in canonical order.
    pub fn all() -> &'static [WorkshopStep] {
        &[
            WorkshopStep::BigIdea,
            WorkshopStep::TriggerEvents,
            WorkshopStep::Jobs,
            WorkshopStep::TargetBuyers,
            WorkshopStep::Pains,
            WorkshopStep::ProblemUp,
            WorkshopStep::RefinedIdea,
            WorkshopStep::TargetMarket,
            WorkshopStep::NextSteps,
            WorkshopStep::Reflections,
        ]
    }

    /// Creates a step from its 1-based number.
    pub fn from_number(number: u8) -> Result<Self, ValidationError> {
        if !(Self::FIRST..=Self::LAST).contains(&number) {
            return Err(ValidationError::out_of_range(
                "current_step",
                Self::FIRST as i32,
                Self::LAST as i32,
                number as i32,
            ));
        }
        Ok(Self::all()[(number - 1) as usize])
    }

    /// Returns the 1-based step number.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Returns the next step, if any.
    pub fn next(&self) -> Option<WorkshopStep> {
        Self::from_number(self.number() + 1).ok()
    }

    /// Returns the previous step, if any.
    pub fn previous(&self) -> Option<WorkshopStep> {
        self.number()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }

    /// Returns true for the final step.
    pub fn is_last(&self) -> bool {
        self.number() == Self::LAST
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkshopStep::BigIdea => "Big Idea",
            WorkshopStep::TriggerEvents => "Trigger Events",
            WorkshopStep::Jobs => "Jobs to be Done",
            WorkshopStep::TargetBuyers => "Target Buyers",
            WorkshopStep::Pains => "Pains",
            WorkshopStep::ProblemUp => "Problem-Up",
            WorkshopStep::RefinedIdea => "Refined Idea",
            WorkshopStep::TargetMarket => "Target Market",
            WorkshopStep::NextSteps => "Next Steps",
            WorkshopStep::Reflections => "Reflections",
        }
    }
}

impl TryFrom<u8> for WorkshopStep {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value)
    }
}

impl From<WorkshopStep> for u8 {
    fn from(step: WorkshopStep) -> Self {
        step.number()
    }
}

impl fmt::Display for WorkshopStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.display_name())
    }
}
