//! HTTP handlers for the session service.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::SecretString;

use crate::domain::foundation::{ErrorCode, SessionId, Timestamp, WorkshopStep};
use crate::ports::{GatewayError, SessionGateway, WorkshopRecord};

use super::dto::{ErrorResponse, HealthResponse, SaveSessionRequest, UpdateStepRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionServiceState {
    gateway: Arc<dyn SessionGateway>,
    api_key: Option<Arc<SecretString>>,
}

impl SessionServiceState {
    pub fn new(gateway: Arc<dyn SessionGateway>) -> Self {
        Self {
            gateway,
            api_key: None,
        }
    }

    /// Require `Authorization: Bearer <key>` on the `/sessions` routes.
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(Arc::new(api_key));
        self
    }

    pub(super) fn api_key(&self) -> Option<Arc<SecretString>> {
        self.api_key.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /sessions - Create or overwrite a session record
pub async fn create_session(
    State(state): State<SessionServiceState>,
    body: Result<Json<WorkshopRecord>, JsonRejection>,
) -> Response {
    let mut record = match body {
        Ok(Json(record)) => record,
        Err(rejection) => return bad_body(rejection),
    };
    record.updated_at = Timestamp::now();

    match state.gateway.create(&record).await {
        Ok(()) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// GET /sessions/:id - Fetch a session record
pub async fn get_session(
    State(state): State<SessionServiceState>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.gateway.load(&session_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// PUT /sessions/:id - Overwrite the document and step
pub async fn save_session(
    State(state): State<SessionServiceState>,
    Path(session_id): Path<String>,
    body: Result<Json<SaveSessionRequest>, JsonRejection>,
) -> Response {
    let session_id = match parse_session_id(session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(rejection),
    };

    match state
        .gateway
        .save(&session_id, &req.workshop_data, req.current_step)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// PATCH /sessions/:id/step - Move the session to another step
pub async fn update_step(
    State(state): State<SessionServiceState>,
    Path(session_id): Path<String>,
    body: Result<Json<UpdateStepRequest>, JsonRejection>,
) -> Response {
    let session_id = match parse_session_id(session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return bad_body(rejection),
    };
    let step = match WorkshopStep::from_number(req.current_step) {
        Ok(step) => step,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(e.to_string())))
                .into_response()
        }
    };

    match state.gateway.update_step(&session_id, step).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_gateway_error(e),
    }
}

/// GET /health - Liveness check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: String) -> Result<SessionId, Response> {
    SessionId::new(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn bad_body(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request(rejection.body_text())),
    )
        .into_response()
}

fn handle_gateway_error(error: GatewayError) -> Response {
    match error {
        GatewayError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Session", id.as_str())),
        )
            .into_response(),
        GatewayError::Transient(msg) => {
            tracing::warn!(error = %msg, "Session storage unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::new(ErrorCode::StorageError, msg)),
            )
                .into_response()
        }
        GatewayError::Serialization(msg) => {
            tracing::error!(error = %msg, "Stored session could not be decoded");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(ErrorCode::SerializationError, msg)),
            )
                .into_response()
        }
    }
}
