//! In-memory adapters for deterministic tests and single-process setups.

mod registry;
mod transport;

pub use registry::InMemoryPortRegistry;
pub use transport::{
    DEFAULT_FIRST_HANDLE, DEFAULT_MAX_PAYLOAD_BYTES, InMemoryTransport, InMemoryTransportHub,
    TransportCallCounts,
};
