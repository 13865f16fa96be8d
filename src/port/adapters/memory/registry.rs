//! In-memory port registry.

use crate::port::{
    domain::PortIdentity,
    ports::{PortRegistry, PortRegistryError, PortRegistryResult},
};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, RwLock};

static PROCESS_REGISTRY: OnceLock<InMemoryPortRegistry> = OnceLock::new();

/// Thread-safe in-memory set of listening port identities.
///
/// Clones share the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPortRegistry {
    state: Arc<RwLock<HashSet<PortIdentity>>>,
}

impl InMemoryPortRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry, created on first access.
    ///
    /// Ports only share this instance when they are handed it explicitly;
    /// tests should prefer a fresh [`InMemoryPortRegistry::new`].
    #[must_use]
    pub fn global() -> &'static Self {
        PROCESS_REGISTRY.get_or_init(Self::new)
    }
}

impl PortRegistry for InMemoryPortRegistry {
    fn register(&self, identity: &PortIdentity) -> PortRegistryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            PortRegistryError::storage(std::io::Error::other(err.to_string()))
        })?;

        if !state.insert(identity.clone()) {
            return Err(PortRegistryError::AlreadyRegistered(identity.clone()));
        }
        Ok(())
    }

    fn unregister(&self, identity: &PortIdentity) -> PortRegistryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            PortRegistryError::storage(std::io::Error::other(err.to_string()))
        })?;

        if !state.remove(identity) {
            return Err(PortRegistryError::NotRegistered(identity.clone()));
        }
        Ok(())
    }

    fn contains(&self, identity: &PortIdentity) -> PortRegistryResult<bool> {
        let state = self.state.read().map_err(|err| {
            PortRegistryError::storage(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.contains(identity))
    }

    fn list(&self) -> PortRegistryResult<Vec<PortIdentity>> {
        let state = self.state.read().map_err(|err| {
            PortRegistryError::storage(std::io::Error::other(err.to_string()))
        })?;
        let mut identities: Vec<PortIdentity> = state.iter().cloned().collect();
        identities.sort();
        Ok(identities)
    }
}
