//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionGateway` - The remote store holding workshop records
//! - `SessionIdSlot` - Durable pointer to the last active session

mod session_gateway;
mod session_id_slot;

pub use session_gateway::{GatewayError, GatewayErrorKind, SessionGateway, WorkshopRecord};
pub use session_id_slot::{SessionIdSlot, SlotError};
