//! HTTP routes for the session service.

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::adapters::http::middleware::require_api_key;

use super::handlers::{
    create_session, get_session, health, save_session, update_step, SessionServiceState,
};

/// Creates the session service router.
///
/// # Routes
///
/// - `POST /sessions` - Create or overwrite a record
/// - `GET /sessions/:id` - Fetch a record
/// - `PUT /sessions/:id` - Overwrite document and step
/// - `PATCH /sessions/:id/step` - Update the step only
/// - `GET /health` - Liveness check, never behind the API key
pub fn session_store_routes(state: SessionServiceState) -> Router {
    let sessions = Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).put(save_session))
        .route("/sessions/:id/step", patch(update_step));

    let sessions = match state.api_key() {
        Some(key) => sessions.route_layer(middleware::from_fn_with_state(key, require_api_key)),
        None => sessions,
    };

    sessions.route("/health", get(health)).with_state(state)
}
