//! Session Id Slot Port - Durable "last session" pointer.
//!
//! Holds at most one session id between process runs so that
//! `initialize_session` can resume where the user left off.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;

/// Errors raised by a slot implementation.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Stored session id is invalid: {0}")]
    Corrupt(String),
}

/// Port for the persisted session-id slot.
#[async_trait]
pub trait SessionIdSlot: Send + Sync {
    /// Returns the stored id, or `None` if the slot is empty.
    async fn load(&self) -> Result<Option<SessionId>, SlotError>;

    /// Replaces the stored id.
    async fn store(&self, session_id: &SessionId) -> Result<(), SlotError>;

    /// Empties the slot. Clearing an empty slot succeeds.
    async fn clear(&self) -> Result<(), SlotError>;
}
