//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - In-memory and YAML-file gateways, session-id slots
//! - `postgres` - PostgreSQL gateway
//! - `remote` - HTTP client gateway for a remote session service
//! - `http` - The session service itself (axum)

pub mod http;
pub mod postgres;
pub mod remote;
pub mod storage;
