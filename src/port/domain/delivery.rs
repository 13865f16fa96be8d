//! Messages handed to observers of a listening port.

use super::Bundle;
use chrono::{DateTime, Utc};
use mockable::Clock;

/// Origin of a delivered message.
///
/// Present only when the remote side supplied its own port as a reply
/// address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSender {
    app_id: Option<String>,
    port_name: String,
    trusted: bool,
}

impl MessageSender {
    /// Creates sender metadata.
    #[must_use]
    pub fn new(app_id: Option<String>, port_name: impl Into<String>, trusted: bool) -> Self {
        Self {
            app_id,
            port_name: port_name.into(),
            trusted,
        }
    }

    /// Returns the sending application identifier, when the transport
    /// reported one.
    #[must_use]
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Returns the reply port name.
    #[must_use]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Returns whether the reply port is trusted.
    #[must_use]
    pub const fn trusted(&self) -> bool {
        self.trusted
    }
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    payload: Bundle,
    sender: Option<MessageSender>,
    received_at: DateTime<Utc>,
}

impl DeliveredMessage {
    /// Creates a delivered message stamped with the clock's current time.
    #[must_use]
    pub fn new(payload: Bundle, sender: Option<MessageSender>, clock: &impl Clock) -> Self {
        Self {
            payload,
            sender,
            received_at: clock.utc(),
        }
    }

    /// Returns the decoded payload.
    #[must_use]
    pub const fn payload(&self) -> &Bundle {
        &self.payload
    }

    /// Returns the sender metadata, if any was supplied.
    #[must_use]
    pub const fn sender(&self) -> Option<&MessageSender> {
        self.sender.as_ref()
    }

    /// Returns when the delivery callback decoded the message.
    #[must_use]
    pub const fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Consumes the message, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bundle {
        self.payload
    }
}
