//! Session service HTTP adapter.
//!
//! Exposes any `SessionGateway` over HTTP so that a remote
//! `HttpSessionGateway` can use it as its backing store.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, HealthResponse, SaveSessionRequest, UpdateStepRequest};
pub use handlers::SessionServiceState;
pub use routes::session_store_routes;
