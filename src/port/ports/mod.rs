//! Port contracts for message port registration and delivery.

mod registry;
mod transport;

pub use registry::{PortRegistry, PortRegistryError, PortRegistryResult};
pub use transport::{
    DeliveryCallback, InboundMessage, OutboundMessage, PortTransport, TransportErrorCode,
};

#[cfg(test)]
pub use transport::MockPortTransport;
