//! Integration tests for the session service router.
//!
//! Drives the full router (middleware included) with `oneshot` requests over
//! an in-memory gateway.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use discovery_workshop::adapters::http::session_store::ErrorResponse;
use discovery_workshop::adapters::http::{build_router, SessionServiceState};
use discovery_workshop::adapters::storage::{GatewayOp, InMemorySessionGateway};
use discovery_workshop::config::ServerConfig;
use discovery_workshop::domain::foundation::{SessionId, WorkshopStep};
use discovery_workshop::domain::workshop::WorkshopData;
use discovery_workshop::ports::{GatewayError, WorkshopRecord};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn router(gateway: &InMemorySessionGateway) -> Router {
    let state = SessionServiceState::new(Arc::new(gateway.clone()));
    build_router(state, &ServerConfig::default())
}

fn keyed_router(gateway: &InMemorySessionGateway, key: &str) -> Router {
    let state = SessionServiceState::new(Arc::new(gateway.clone()))
        .with_api_key(SecretString::new(key.to_string()));
    build_router(state, &ServerConfig::default())
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_id() -> SessionId {
    SessionId::new("ws-42").unwrap()
}

async fn seed(gateway: &InMemorySessionGateway) {
    gateway
        .insert(WorkshopRecord::new(session_id(), WorkshopData::empty(), WorkshopStep::BigIdea))
        .await;
}

// =============================================================================
// Record lifecycle
// =============================================================================

#[tokio::test]
async fn post_creates_record() {
    let gateway = InMemorySessionGateway::new();

    let response = router(&gateway)
        .oneshot(json_request(
            Method::POST,
            "/sessions",
            json!({ "sessionId": "ws-42", "currentStep": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["sessionId"], "ws-42");
    assert_eq!(body["workshopData"]["refinedIdea"]["version"], "refined");
    assert!(gateway.record(&session_id()).await.is_some());
}

#[tokio::test]
async fn get_returns_stored_record() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let response = router(&gateway)
        .oneshot(empty_request(Method::GET, "/sessions/ws-42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let record: WorkshopRecord = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(record.session_id, session_id());
    assert_eq!(record.current_step, WorkshopStep::BigIdea);
}

#[tokio::test]
async fn get_unknown_session_is_404_with_envelope() {
    let gateway = InMemorySessionGateway::new();

    let response = router(&gateway)
        .oneshot(empty_request(Method::GET, "/sessions/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, "NOT_FOUND");
}

#[tokio::test]
async fn put_overwrites_document_and_step() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let response = router(&gateway)
        .oneshot(json_request(
            Method::PUT,
            "/sessions/ws-42",
            json!({
                "workshopData": {
                    "triggerEvents": [{ "id": "t1", "description": "Lost a client", "source": "user" }]
                },
                "currentStep": 3
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = gateway.record(&session_id()).await.unwrap();
    assert_eq!(stored.current_step, WorkshopStep::Jobs);
    assert_eq!(stored.workshop_data.trigger_events.len(), 1);
    assert_eq!(stored.workshop_data.trigger_events[0].description, "Lost a client");
}

#[tokio::test]
async fn put_unknown_session_is_404() {
    let gateway = InMemorySessionGateway::new();

    let response = router(&gateway)
        .oneshot(json_request(
            Method::PUT,
            "/sessions/ws-42",
            json!({ "workshopData": {}, "currentStep": 2 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_step_updates_only_the_step() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let response = router(&gateway)
        .oneshot(json_request(
            Method::PATCH,
            "/sessions/ws-42/step",
            json!({ "currentStep": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let stored = gateway.record(&session_id()).await.unwrap();
    assert_eq!(stored.current_step, WorkshopStep::Reflections);
    assert_eq!(stored.workshop_data, WorkshopData::empty());
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn patch_with_out_of_range_step_is_400() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let response = router(&gateway)
        .oneshot(json_request(
            Method::PATCH,
            "/sessions/ws-42/step",
            json!({ "currentStep": 11 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, "BAD_REQUEST");
    assert_eq!(gateway.step_update_count(), 0);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let gateway = InMemorySessionGateway::new();

    let response = router(&gateway)
        .oneshot(json_request(Method::POST, "/sessions", json!({ "currentStep": 1 })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.create_count(), 0);
}

#[tokio::test]
async fn transient_backend_failure_is_503() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;
    gateway.fail_next(GatewayOp::Load, GatewayError::transient("disk busy"));

    let response = router(&gateway)
        .oneshot(empty_request(Method::GET, "/sessions/ws-42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, "STORAGE_ERROR");
}

#[tokio::test]
async fn undecodable_record_is_422() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;
    gateway.fail_next(GatewayOp::Load, GatewayError::serialization("bad yaml"));

    let response = router(&gateway)
        .oneshot(empty_request(Method::GET, "/sessions/ws-42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// API key
// =============================================================================

#[tokio::test]
async fn missing_api_key_is_401() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let response = keyed_router(&gateway, "s3cret")
        .oneshot(empty_request(Method::GET, "/sessions/ws-42"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.code, "UNAUTHORIZED");
    assert_eq!(gateway.load_count(), 0);
}

#[tokio::test]
async fn wrong_api_key_is_401() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let request = Request::builder()
        .uri("/sessions/ws-42")
        .header(header::AUTHORIZATION, "Bearer guess")
        .body(Body::empty())
        .unwrap();
    let response = keyed_router(&gateway, "s3cret").oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn correct_api_key_is_accepted() {
    let gateway = InMemorySessionGateway::new();
    seed(&gateway).await;

    let request = Request::builder()
        .uri("/sessions/ws-42")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let response = keyed_router(&gateway, "s3cret").oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_is_open_even_with_api_key() {
    let gateway = InMemorySessionGateway::new();

    let response = keyed_router(&gateway, "s3cret")
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
