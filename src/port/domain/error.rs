//! Error types for message port domain validation and payload codecs.

use thiserror::Error;

/// Errors returned while constructing message port domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortDomainError {
    /// The port name is empty.
    #[error("port name must not be empty")]
    EmptyPortName,

    /// The payload bundle could not be serialized for the transport.
    #[error("payload could not be encoded: {0}")]
    PayloadEncoding(String),

    /// Raw payload bytes delivered by the transport are not a bundle.
    #[error("payload could not be decoded: {0}")]
    PayloadDecoding(String),
}
