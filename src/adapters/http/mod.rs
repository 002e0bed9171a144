//! HTTP adapters - REST API implementations.
//!
//! - `session_store` - The session service (any `SessionGateway` over HTTP)
//! - `middleware` - Cross-cutting request checks

pub mod middleware;
pub mod session_store;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

pub use session_store::{session_store_routes, SessionServiceState};

/// The session service router with tracing, timeout and CORS layers applied.
pub fn build_router(state: SessionServiceState, server: &ServerConfig) -> Router {
    let router = session_store_routes(state)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        router
    } else {
        router.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    }
}
