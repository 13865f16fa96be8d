//! Registry port tracking which port identities are listening.

use crate::port::domain::PortIdentity;
use std::sync::Arc;
use thiserror::Error;

/// Result type for port registry operations.
pub type PortRegistryResult<T> = Result<T, PortRegistryError>;

/// Table of currently listening local ports.
///
/// Implementations must serialize mutations so that, of two concurrent
/// `register` calls for the same identity, exactly one succeeds.
pub trait PortRegistry: Send + Sync {
    /// Marks an identity as listening.
    ///
    /// # Errors
    ///
    /// Returns [`PortRegistryError::AlreadyRegistered`] when the identity is
    /// already present.
    fn register(&self, identity: &PortIdentity) -> PortRegistryResult<()>;

    /// Removes an identity.
    ///
    /// # Errors
    ///
    /// Returns [`PortRegistryError::NotRegistered`] when the identity is
    /// absent.
    fn unregister(&self, identity: &PortIdentity) -> PortRegistryResult<()>;

    /// Returns whether an identity is currently listening.
    fn contains(&self, identity: &PortIdentity) -> PortRegistryResult<bool>;

    /// Returns every listening identity, sorted by name then trust flag.
    fn list(&self) -> PortRegistryResult<Vec<PortIdentity>>;
}

/// Errors returned by port registry implementations.
#[derive(Debug, Clone, Error)]
pub enum PortRegistryError {
    /// The identity already has an active registration.
    #[error("port {0} is already registered")]
    AlreadyRegistered(PortIdentity),

    /// The identity has no active registration.
    #[error("port {0} is not registered")]
    NotRegistered(PortIdentity),

    /// The backing store failed.
    #[error("registry storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl PortRegistryError {
    /// Wraps a backing-store failure.
    #[must_use]
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
