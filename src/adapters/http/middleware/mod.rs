//! HTTP middleware.
//!
//! - `api_key` - Bearer shared-key check for the session service

mod api_key;

pub use api_key::require_api_key;
