//! Structural identity of a message port.

use super::PortName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The `(name, trusted)` pair identifying a local message port.
///
/// Two ports with the same name but different trust flags are distinct
/// endpoints. Equality and hashing depend on these two fields only, so an
/// identity stays stable across the listen/stop lifecycle of the port that
/// owns it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortIdentity {
    name: PortName,
    trusted: bool,
}

impl PortIdentity {
    /// Creates an identity from a validated name and trust flag.
    #[must_use]
    pub const fn new(name: PortName, trusted: bool) -> Self {
        Self { name, trusted }
    }

    /// Returns the port name.
    #[must_use]
    pub const fn name(&self) -> &PortName {
        &self.name
    }

    /// Returns whether the identity lives in the trusted namespace.
    #[must_use]
    pub const fn trusted(&self) -> bool {
        self.trusted
    }
}

impl fmt::Display for PortIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.trusted { "trusted" } else { "untrusted" };
        write!(f, "{} ({class})", self.name)
    }
}
