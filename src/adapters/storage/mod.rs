//! Storage Adapters
//!
//! Local implementations of the `SessionGateway` and `SessionIdSlot` ports.
//!
//! ## Available Adapters
//!
//! - **FileSessionGateway** - Stores records as YAML files on disk
//! - **InMemorySessionGateway** - Stores records in memory (testing/development)
//! - **FileSessionIdSlot** / **InMemorySessionIdSlot** - The last-session pointer
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionGateway, InMemorySessionGateway};
//!
//! // Production: file-based storage
//! let gateway = FileSessionGateway::new("./data/sessions");
//!
//! // Testing: in-memory storage
//! let gateway = InMemorySessionGateway::new();
//! ```

mod file_session_gateway;
mod in_memory_session_gateway;
mod session_id_slot;

pub use file_session_gateway::FileSessionGateway;
pub use in_memory_session_gateway::{GatewayOp, InMemorySessionGateway};
pub use session_id_slot::{FileSessionIdSlot, InMemorySessionIdSlot};
