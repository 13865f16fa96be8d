//! Opaque registration handle assigned by the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive handle returned by the transport for a live registration.
///
/// The handle doubles as the return address of outbound messages. A port
/// holds one exactly while it is listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationHandle(i32);

impl RegistrationHandle {
    /// Interprets a raw register result, returning `None` unless it is
    /// strictly positive.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        if raw > 0 { Some(Self(raw)) } else { None }
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RegistrationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(7, Some(7))]
    #[case(1, Some(1))]
    #[case(0, None)]
    #[case(-22, None)]
    fn only_positive_values_are_handles(#[case] raw: i32, #[case] expected: Option<i32>) {
        assert_eq!(RegistrationHandle::from_raw(raw).map(RegistrationHandle::get), expected);
    }
}
