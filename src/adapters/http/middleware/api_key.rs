//! Shared-key bearer authentication for the session service.
//!
//! ```text
//! Authorization: Bearer <key>
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::http::session_store::ErrorResponse;

/// Rejects requests whose bearer token does not match `expected`.
pub async fn require_api_key(
    State(expected): State<Arc<SecretString>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| keys_match(token, expected.expose_secret()));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected request without valid API key");
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::unauthorized())).into_response()
}

fn keys_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}
