//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `workshop` - The discovery workshop aggregate and its entities

pub mod foundation;
pub mod workshop;
