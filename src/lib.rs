//! msgport: named, bidirectional inter-process message ports.
//!
//! A process registers a uniquely named local endpoint (optionally
//! "trusted", restricting peers to applications signed by the same
//! certificate) and other processes address messages to it by application
//! identifier and port name.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: port identity, payload bundles, delivered messages
//! - **Ports**: the platform transport and the port registry contracts
//! - **Adapters**: in-memory transport and registry implementations
//! - **Services**: the [`port::services::MessagePort`] handle, observer
//!   fan-out and delivery dispatch
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use msgport::port::{
//!     adapters::memory::{InMemoryPortRegistry, InMemoryTransport},
//!     domain::{Bundle, RemotePort},
//!     services::{MessagePort, MessagePortContext},
//! };
//!
//! let context = MessagePortContext::new(
//!     Arc::new(InMemoryTransport::new("org.example.app")),
//!     Arc::new(InMemoryPortRegistry::new()),
//!     Arc::new(DefaultClock),
//! );
//!
//! let mut port = MessagePort::new("svc.local", false, &context).expect("valid port name");
//! port.listen().expect("listen should succeed");
//!
//! let payload = Bundle::new().with_string("k", "v");
//! port.send(&payload, &RemotePort::new("org.example.app", "svc.local"))
//!     .expect("send should succeed");
//! assert_eq!(port.dispatch_pending(), 1);
//!
//! port.close().expect("close should succeed");
//! ```

pub mod port;
