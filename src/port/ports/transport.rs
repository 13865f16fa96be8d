//! Platform transport port for cross-process registration and delivery.
//!
//! The contract mirrors the native primitive: calls return raw integer
//! status codes, and inbound messages arrive through a callback invoked on a
//! context owned by the transport.

use crate::port::domain::{PortName, RegistrationHandle};
use std::fmt;
use std::sync::Arc;

/// Callback invoked by the transport once per inbound message.
///
/// The transport may call it from any thread, concurrently with register,
/// unregister and send calls.
pub type DeliveryCallback = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Raw inbound message as produced by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Handle of the local port the message was addressed to.
    pub local_handle: i32,
    /// Sending application, when reported.
    pub remote_app_id: Option<String>,
    /// Reply port of the sender, when the sender supplied one.
    pub remote_port_name: Option<String>,
    /// Whether the reply port is trusted.
    pub remote_trusted: bool,
    /// Encoded payload bundle.
    pub payload: Vec<u8>,
}

/// Outbound message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination application.
    pub remote_app_id: String,
    /// Destination port name.
    pub remote_port_name: String,
    /// Handle of the sending port, used as the reply address.
    pub local_handle: RegistrationHandle,
    /// Selects the trusted send primitive.
    pub trusted: bool,
    /// Encoded payload bundle.
    pub payload: Vec<u8>,
}

/// Native registration and delivery primitive.
#[cfg_attr(test, mockall::automock)]
pub trait PortTransport: Send + Sync {
    /// Registers a local port in the trusted or untrusted namespace.
    ///
    /// Returns a positive handle on success; zero or a negative status code
    /// otherwise.
    fn register(&self, name: &PortName, trusted: bool, callback: DeliveryCallback) -> i32;

    /// Unregisters a local port. Returns `0` on success.
    fn unregister(&self, handle: RegistrationHandle, trusted: bool) -> i32;

    /// Sends a message to a remote port. Returns `0` on success.
    fn send(&self, message: OutboundMessage) -> i32;
}

const MESSAGE_PORT_ERROR_CLASS: i32 = -0x0114_0000;

/// Non-zero status code reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportErrorCode(i32);

impl TransportErrorCode {
    /// Input/output failure inside the transport.
    pub const IO_ERROR: Self = Self(-5);
    /// The transport ran out of memory.
    pub const OUT_OF_MEMORY: Self = Self(-12);
    /// The caller lacks the messaging privilege.
    pub const PERMISSION_DENIED: Self = Self(-13);
    /// An argument was rejected by the transport.
    pub const INVALID_PARAMETER: Self = Self(-22);
    /// The destination port does not exist.
    pub const PORT_NOT_FOUND: Self = Self(MESSAGE_PORT_ERROR_CLASS | 0x01);
    /// Trusted communication between applications signed by different
    /// certificates.
    pub const CERTIFICATE_NOT_MATCH: Self = Self(MESSAGE_PORT_ERROR_CLASS | 0x02);
    /// The payload exceeds the transport's hard limit.
    pub const MAX_EXCEEDED: Self = Self(MESSAGE_PORT_ERROR_CLASS | 0x03);
    /// The transport cannot take the request right now.
    pub const RESOURCE_UNAVAILABLE: Self = Self(MESSAGE_PORT_ERROR_CLASS | 0x04);

    /// Interprets a raw status, returning `None` for success (`0`).
    #[must_use]
    pub const fn from_status(raw: i32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Interprets a failed register result.
    ///
    /// A zero handle carries no status of its own and is reported as an
    /// I/O error.
    #[must_use]
    pub const fn from_failed_registration(raw: i32) -> Self {
        if raw == 0 { Self::IO_ERROR } else { Self(raw) }
    }

    /// Returns the raw status value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Returns whether the code reports an oversized payload.
    #[must_use]
    pub const fn is_max_exceeded(self) -> bool {
        self.0 == Self::MAX_EXCEEDED.0
    }

    /// Returns a short description of the status.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::IO_ERROR => "i/o error",
            Self::OUT_OF_MEMORY => "out of memory",
            Self::PERMISSION_DENIED => "permission denied",
            Self::INVALID_PARAMETER => "invalid parameter",
            Self::PORT_NOT_FOUND => "port not found",
            Self::CERTIFICATE_NOT_MATCH => "certificate does not match",
            Self::MAX_EXCEEDED => "message exceeds the maximum size",
            Self::RESOURCE_UNAVAILABLE => "resource unavailable",
            _ => "unknown transport error",
        }
    }
}

impl fmt::Display for TransportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description(), self.0)
    }
}
