//! Remote session service configuration for the `remote` storage backend

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the session service, e.g. `https://sessions.example.com`
    pub base_url: String,

    /// Bearer key sent with every request
    pub api_key: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate remote configuration
    pub fn validate(&self, production: bool) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("REMOTE__BASE_URL"));
        }
        let https = self.base_url.starts_with("https://");
        if !https && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidRemoteUrl);
        }
        if production && !https {
            return Err(ValidationError::RemoteMustBeHttps);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
