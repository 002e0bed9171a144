//! Workshop domain - the ten-step discovery document.
//!
//! [`WorkshopData`] is the aggregate. Each step edits one or two of its
//! top-level fields; [`WorkshopPatch`] carries those edits as whole-field
//! replacements.
//!
//! Cross-entity links (problem-up selections) are plain ids and may dangle
//! after the referenced entity is deleted. [`Reference`] resolves them for
//! display.

mod buyer;
mod data;
mod errors;
mod idea;
mod job;
mod next_steps;
mod pain;
mod patch;
mod problem_up;
mod references;
mod reflections;
mod source;
mod target_market;
mod trigger;

pub use buyer::{mark_top_three, top_three_count, unmark_top_three, TargetBuyer, MAX_TOP_THREE};
pub use data::{step_fields, WorkshopData};
pub use errors::WorkshopError;
pub use idea::{Idea, IdeaVersion};
pub use job::{clear_overarching, set_overarching, Job};
pub use next_steps::NextSteps;
pub use pain::{FireScores, Pain, PainType, FIRE_THRESHOLD};
pub use patch::{WorkshopField, WorkshopPatch};
pub use problem_up::{ProblemUp, MAX_SELECTED_PAINS};
pub use references::{Describe, Reference, NOT_FOUND_LABEL, NOT_SPECIFIED_LABEL};
pub use reflections::Reflections;
pub use source::EntrySource;
pub use target_market::TargetMarketProfile;
pub use trigger::TriggerEvent;
