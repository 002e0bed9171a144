//! File-based Session Gateway Adapter
//!
//! Stores each workshop record as a YAML file named after its session id.
//! Writes go to a uniquely named temporary file first and are renamed into
//! place. Read-modify-write operations on one session are serialized.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::foundation::{SessionId, Timestamp, WorkshopStep};
use crate::domain::workshop::WorkshopData;
use crate::ports::{GatewayError, SessionGateway, WorkshopRecord};

/// File-based storage for workshop records
#[derive(Debug, Clone)]
pub struct FileSessionGateway {
    base_path: PathBuf,
    /// One write lock per session id, shared by clones.
    write_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl FileSessionGateway {
    /// Create a file gateway rooted at `base_path`
    ///
    /// # Example
    /// ```ignore
    /// let gateway = FileSessionGateway::new("./data/sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Holds the session's write lock until the guard is dropped.
    async fn lock_session(&self, session_id: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.write_locks.lock().await;
            Arc::clone(locks.entry(session_id.as_str().to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Path of the record file, or `None` when the id is not a safe file name.
    fn record_path(&self, session_id: &SessionId) -> Option<PathBuf> {
        let id = session_id.as_str();
        let safe = id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.base_path.join(format!("{}.yaml", id)))
    }

    async fn read_record(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        let path = self
            .record_path(session_id)
            .ok_or_else(|| GatewayError::NotFound(session_id.clone()))?;

        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GatewayError::NotFound(session_id.clone()))
            }
            Err(e) => return Err(GatewayError::transient(e)),
        };

        serde_yaml::from_str(&yaml).map_err(GatewayError::serialization)
    }

    async fn write_record(&self, record: &WorkshopRecord) -> Result<(), GatewayError> {
        let path = self.record_path(&record.session_id).ok_or_else(|| {
            GatewayError::serialization(format!(
                "session id '{}' is not usable as a file name",
                record.session_id
            ))
        })?;

        fs::create_dir_all(&self.base_path)
            .await
            .map_err(GatewayError::transient)?;

        let yaml = serde_yaml::to_string(record).map_err(GatewayError::serialization)?;

        let tmp = self
            .base_path
            .join(format!("{}.{}.tmp", record.session_id, Uuid::new_v4().simple()));
        fs::write(&tmp, yaml).await.map_err(GatewayError::transient)?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(GatewayError::transient(e));
        }

        Ok(())
    }
}

#[async_trait]
impl SessionGateway for FileSessionGateway {
    async fn load(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        self.read_record(session_id).await
    }

    async fn create(&self, record: &WorkshopRecord) -> Result<(), GatewayError> {
        let _guard = self.lock_session(&record.session_id).await;
        self.write_record(record).await
    }

    async fn save(
        &self,
        session_id: &SessionId,
        data: &WorkshopData,
        step: WorkshopStep,
    ) -> Result<(), GatewayError> {
        let _guard = self.lock_session(session_id).await;
        let mut record = self.read_record(session_id).await?;
        record.workshop_data = data.clone();
        record.current_step = step;
        record.updated_at = Timestamp::now();
        self.write_record(&record).await
    }

    async fn update_step(&self, session_id: &SessionId, step: WorkshopStep) -> Result<(), GatewayError> {
        let _guard = self.lock_session(session_id).await;
        let mut record = self.read_record(session_id).await?;
        record.current_step = step;
        record.updated_at = Timestamp::now();
        self.write_record(&record).await
    }
}
