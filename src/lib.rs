//! Discovery Workshop - session state and persistence engine
//!
//! Holds the aggregate a participant builds across the ten workshop steps,
//! keeps it in sync with a remote record store through debounced autosave,
//! and ships the record store itself as an axum service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
