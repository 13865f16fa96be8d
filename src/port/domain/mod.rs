//! Domain model for message port identity, payloads and deliveries.
//!
//! The domain covers validated port names, the structural identity that
//! keys the registry, opaque registration handles, the key-value payload
//! bundle, and the messages handed to observers. Transport and registry
//! concerns remain outside this boundary.

mod bundle;
mod delivery;
mod error;
mod handle;
mod identity;
mod name;
mod remote;

pub use bundle::{Bundle, BundleValue};
pub use delivery::{DeliveredMessage, MessageSender};
pub use error::PortDomainError;
pub use handle::RegistrationHandle;
pub use identity::PortIdentity;
pub use name::PortName;
pub use remote::RemotePort;
