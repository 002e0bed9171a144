//! PostgreSQL adapters - Database implementations for the gateway port.
//!
//! - `PostgresSessionGateway` - Workshop records as JSONB rows

mod session_gateway;

pub use session_gateway::PostgresSessionGateway;
