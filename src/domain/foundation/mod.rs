//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the workshop domain.

mod errors;
mod ids;
mod rating;
mod step;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{BuyerId, JobId, PainId, SessionId, TriggerId};
pub use rating::{BuyerRating, FireLevel};
pub use step::WorkshopStep;
pub use timestamp::Timestamp;
