//! Remote adapters - Gateways that reach another session service over HTTP.

mod http_session_gateway;

pub use http_session_gateway::{HttpSessionGateway, HttpSessionGatewayConfig};
