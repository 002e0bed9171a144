//! Session Gateway Port - Interface for the remote workshop record store.
//!
//! The session store is the only caller. Each method issues a single request;
//! retries and coalescing live in the store, not here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ErrorCode, SessionId, Timestamp, WorkshopStep};
use crate::domain::workshop::WorkshopData;

/// Errors that can occur talking to the record store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Transient storage failure: {0}")]
    Transient(String),

    #[error("Failed to (de)serialize session record: {0}")]
    Serialization(String),
}

impl GatewayError {
    pub fn transient(message: impl ToString) -> Self {
        GatewayError::Transient(message.to_string())
    }

    pub fn serialization(message: impl ToString) -> Self {
        GatewayError::Serialization(message.to_string())
    }

    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Transient(_))
    }

    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::NotFound(_) => GatewayErrorKind::NotFound,
            GatewayError::Transient(_) => GatewayErrorKind::Transient,
            GatewayError::Serialization(_) => GatewayErrorKind::Serialization,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::NotFound(_) => ErrorCode::SessionNotFound,
            GatewayError::Transient(_) => ErrorCode::StorageError,
            GatewayError::Serialization(_) => ErrorCode::SerializationError,
        }
    }
}

/// Payload-free classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    NotFound,
    Transient,
    Serialization,
}

/// One stored workshop session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopRecord {
    pub session_id: SessionId,
    #[serde(default)]
    pub workshop_data: WorkshopData,
    #[serde(default)]
    pub current_step: WorkshopStep,
    #[serde(default)]
    pub updated_at: Timestamp,
}

impl WorkshopRecord {
    /// A record for a session that has just started.
    pub fn new(session_id: SessionId, workshop_data: WorkshopData, current_step: WorkshopStep) -> Self {
        Self {
            session_id,
            workshop_data,
            current_step,
            updated_at: Timestamp::now(),
        }
    }
}

/// Port for the remote store holding workshop records.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Fetch a record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists for `session_id`
    /// - `Transient` on I/O or network failure
    /// - `Serialization` if the stored document cannot be decoded
    async fn load(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError>;

    /// Create a record, overwriting any existing one with the same id.
    async fn create(&self, record: &WorkshopRecord) -> Result<(), GatewayError>;

    /// Overwrite the document and step of an existing record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record was never created
    async fn save(
        &self,
        session_id: &SessionId,
        data: &WorkshopData,
        step: WorkshopStep,
    ) -> Result<(), GatewayError>;

    /// Update only the current step of an existing record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the record was never created
    async fn update_step(&self, session_id: &SessionId, step: WorkshopStep) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn SessionGateway) {}
    }

    #[test]
    fn not_found_error_names_the_session() {
        let err = GatewayError::NotFound(SessionId::new("abc").unwrap());
        assert!(err.to_string().contains("abc"));
        assert_eq!(err.kind(), GatewayErrorKind::NotFound);
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(GatewayError::transient("timeout").is_transient());
        assert!(!GatewayError::serialization("bad").is_transient());
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let record = WorkshopRecord::new(
            SessionId::new("s1").unwrap(),
            WorkshopData::empty(),
            WorkshopStep::TriggerEvents,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["currentStep"], 2);
        assert!(json["workshopData"]["bigIdea"].is_object());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn record_missing_document_gets_defaults() {
        let record: WorkshopRecord = serde_json::from_str(r#"{"sessionId":"s1"}"#).unwrap();
        assert_eq!(record.workshop_data, WorkshopData::empty());
        assert_eq!(record.current_step, WorkshopStep::BigIdea);
    }
}
