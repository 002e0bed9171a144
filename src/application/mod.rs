//! Application layer - the session store and step-local autosave.
//!
//! The store is the single writer of workshop state and the only caller of
//! the session gateway. Step drafts feed it through debounced commits.

pub mod autosave;
pub mod session_store;

pub use autosave::{DebouncedCommitter, StepDraft};
pub use session_store::{
    SaveOutcome, SessionSnapshot, SessionStart, SessionStore, SkipReason, StoreConfig,
};
