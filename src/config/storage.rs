//! Storage backend selection

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Where workshop records live
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// YAML files under `data_dir`
    File,
    /// PostgreSQL, configured by the `database` section
    Postgres,
    /// Another session service, configured by the `remote` section
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the `file` backend and the session-id slot
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Directory holding one YAML file per session
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    /// File holding the last active session id
    pub fn session_id_slot_path(&self) -> PathBuf {
        self.data_dir.join("session_id")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::File && self.data_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyDataDir);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
