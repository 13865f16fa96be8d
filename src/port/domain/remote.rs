//! Address of a port owned by another application.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination of an outbound message.
///
/// The trust flag selects the trusted or untrusted send primitive and is
/// unrelated to the trust flag of the sending port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePort {
    app_id: String,
    port_name: String,
    trusted: bool,
}

impl RemotePort {
    /// Addresses the untrusted port `port_name` of application `app_id`.
    #[must_use]
    pub fn new(app_id: impl Into<String>, port_name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            port_name: port_name.into(),
            trusted: false,
        }
    }

    /// Addresses the trusted namespace of the remote application instead.
    #[must_use]
    pub const fn trusted(mut self) -> Self {
        self.trusted = true;
        self
    }

    /// Returns the remote application identifier.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the remote port name.
    #[must_use]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Returns whether the remote port is trusted.
    #[must_use]
    pub const fn is_trusted(&self) -> bool {
        self.trusted
    }
}

impl fmt::Display for RemotePort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_id, self.port_name)
    }
}
