//! Session Id Slot Adapters
//!
//! - **InMemorySessionIdSlot** - Process-local slot (testing/development)
//! - **FileSessionIdSlot** - One-line text file holding the id

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::ports::{SessionIdSlot, SlotError};

/// In-memory session id slot
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionIdSlot {
    value: Arc<RwLock<Option<SessionId>>>,
}

impl InMemorySessionIdSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `session_id`.
    pub fn holding(session_id: SessionId) -> Self {
        Self {
            value: Arc::new(RwLock::new(Some(session_id))),
        }
    }
}

#[async_trait]
impl SessionIdSlot for InMemorySessionIdSlot {
    async fn load(&self) -> Result<Option<SessionId>, SlotError> {
        Ok(self.value.read().await.clone())
    }

    async fn store(&self, session_id: &SessionId) -> Result<(), SlotError> {
        *self.value.write().await = Some(session_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SlotError> {
        *self.value.write().await = None;
        Ok(())
    }
}

/// File-backed session id slot
#[derive(Debug, Clone)]
pub struct FileSessionIdSlot {
    path: PathBuf,
}

impl FileSessionIdSlot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionIdSlot for FileSessionIdSlot {
    async fn load(&self) -> Result<Option<SessionId>, SlotError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SlotError::Io(e.to_string())),
        };

        let line = text.lines().next().unwrap_or("").trim();
        if line.is_empty() {
            return Ok(None);
        }
        SessionId::new(line)
            .map(Some)
            .map_err(|e| SlotError::Corrupt(e.to_string()))
    }

    async fn store(&self, session_id: &SessionId) -> Result<(), SlotError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SlotError::Io(e.to_string()))?;
        }
        fs::write(&self.path, format!("{}\n", session_id))
            .await
            .map_err(|e| SlotError::Io(e.to_string()))
    }

    async fn clear(&self) -> Result<(), SlotError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlotError::Io(e.to_string())),
        }
    }
}
