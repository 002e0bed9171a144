//! HTTP Session Gateway Adapter
//!
//! Talks to a remote session service (see `adapters::http::session_store`).
//!
//! # Status mapping
//!
//! - `404` becomes `GatewayError::NotFound`
//! - other `4xx` become `GatewayError::Serialization` (the request was rejected)
//! - `5xx`, timeouts and connection failures become `GatewayError::Transient`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::http::session_store::{ErrorResponse, SaveSessionRequest, UpdateStepRequest};
use crate::config::RemoteConfig;
use crate::domain::foundation::{SessionId, WorkshopStep};
use crate::domain::workshop::WorkshopData;
use crate::ports::{GatewayError, SessionGateway, WorkshopRecord};

/// Remote session service client configuration.
#[derive(Clone)]
pub struct HttpSessionGatewayConfig {
    base_url: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl HttpSessionGatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&RemoteConfig> for HttpSessionGatewayConfig {
    fn from(config: &RemoteConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            ..Self::new(config.base_url.clone()).with_timeout(config.timeout())
        }
    }
}

/// SessionGateway backed by a remote session service.
#[derive(Clone)]
pub struct HttpSessionGateway {
    config: HttpSessionGatewayConfig,
    http_client: reqwest::Client,
}

impl HttpSessionGateway {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// `Transient` if the TLS backend cannot be initialized.
    pub fn new(config: HttpSessionGatewayConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::transient(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let builder = self.http_client.request(method, url);
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, session_id: &SessionId) -> Result<Response, GatewayError> {
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::transient(format!("Session service unreachable: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(session_id.clone()));
        }

        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => format!("{}: {}", body.code, body.message),
            Err(_) => status.to_string(),
        };
        tracing::warn!(session_id = %session_id, status = %status, error = %message, "Session service request failed");

        if status.is_client_error() {
            Err(GatewayError::serialization(format!("Session service rejected request: {}", message)))
        } else {
            Err(GatewayError::transient(format!("Session service error: {}", message)))
        }
    }
}

fn session_path(session_id: &SessionId) -> String {
    format!("/sessions/{}", session_id)
}

#[async_trait]
impl SessionGateway for HttpSessionGateway {
    async fn load(&self, session_id: &SessionId) -> Result<WorkshopRecord, GatewayError> {
        let response = self
            .send(self.request(Method::GET, &session_path(session_id)), session_id)
            .await?;

        response.json().await.map_err(|e| {
            GatewayError::serialization(format!("Failed to parse session record: {}", e))
        })
    }

    async fn create(&self, record: &WorkshopRecord) -> Result<(), GatewayError> {
        let builder = self.request(Method::POST, "/sessions").json(record);
        self.send(builder, &record.session_id).await?;
        Ok(())
    }

    async fn save(
        &self,
        session_id: &SessionId,
        data: &WorkshopData,
        step: WorkshopStep,
    ) -> Result<(), GatewayError> {
        let body = SaveSessionRequest {
            workshop_data: data.clone(),
            current_step: step,
        };
        let builder = self
            .request(Method::PUT, &session_path(session_id))
            .json(&body);
        self.send(builder, session_id).await?;
        Ok(())
    }

    async fn update_step(&self, session_id: &SessionId, step: WorkshopStep) -> Result<(), GatewayError> {
        let body = UpdateStepRequest {
            current_step: step.number(),
        };
        let builder = self
            .request(Method::PATCH, &format!("{}/step", session_path(session_id)))
            .json(&body);
        self.send(builder, session_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = HttpSessionGatewayConfig::new("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn config_from_remote_section() {
        let remote = RemoteConfig {
            base_url: "https://sessions.example.com".to_string(),
            api_key: Some(SecretString::new("k".to_string())),
            timeout_secs: 3,
        };
        let config = HttpSessionGatewayConfig::from(&remote);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.api_key.unwrap().expose_secret(), "k");
    }

    #[test]
    fn session_paths() {
        let id = SessionId::new("abc").unwrap();
        assert_eq!(session_path(&id), "/sessions/abc");
    }

    #[tokio::test]
    async fn unreachable_service_is_transient() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let gateway = HttpSessionGateway::new(
            HttpSessionGatewayConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let err = gateway.load(&SessionId::new("abc").unwrap()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
