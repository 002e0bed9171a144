//! Autosave and load-retry tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AutosaveConfig {
    /// Quiet period before a step draft commits to the store
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Extra attempts when loading a session fails transiently
    #[serde(default = "default_load_retry_attempts")]
    pub load_retry_attempts: u32,

    /// Base delay between load attempts; attempt `n` waits `n` times this
    #[serde(default = "default_load_retry_backoff_ms")]
    pub load_retry_backoff_ms: u64,
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.load_retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(50..=10_000).contains(&self.debounce_ms) {
            return Err(ValidationError::InvalidDebounce);
        }
        Ok(())
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            load_retry_attempts: default_load_retry_attempts(),
            load_retry_backoff_ms: default_load_retry_backoff_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_load_retry_attempts() -> u32 {
    2
}

fn default_load_retry_backoff_ms() -> u64 {
    250
}
