//! Validated local port name.

use super::PortDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty name of a local message port.
///
/// Names are compared byte for byte; no trimming or case folding is applied,
/// so `"svc.local"` and `"Svc.Local"` address different endpoints.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortName(String);

impl PortName {
    /// Creates a validated port name.
    ///
    /// # Errors
    ///
    /// Returns [`PortDomainError::EmptyPortName`] when the value is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, PortDomainError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(PortDomainError::EmptyPortName);
        }
        Ok(Self(raw))
    }

    /// Returns the port name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PortName {
    type Error = PortDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PortName> for String {
    fn from(value: PortName) -> Self {
        value.0
    }
}

impl AsRef<str> for PortName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
