//! Workshop-specific error types.

use thiserror::Error;

/// Errors raised by the entity-level mutation helpers.
///
/// These never reach the session store: the store's merge path silently
/// normalizes instead. They exist for callers that want to reject an edit
/// (e.g. a fourth top-three buyer) before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkshopError {
    #[error("At most {max} buyers can be marked as top three")]
    TopThreeFull { max: usize },

    #[error("At most {max} pains can be selected for the problem-up")]
    PainSelectionFull { max: usize },

    #[error("{kind} not found: {id}")]
    UnknownEntity { kind: &'static str, id: String },
}

impl WorkshopError {
    /// Creates an unknown entity error.
    pub fn unknown(kind: &'static str, id: impl ToString) -> Self {
        WorkshopError::UnknownEntity {
            kind,
            id: id.to_string(),
        }
    }
}
