//! Shared collaborators for creating message ports.

use super::message_port::{MessagePort, MessagePortResult};
use crate::port::{
    config::PortConfig,
    ports::{PortRegistry, PortTransport},
};
use mockable::Clock;
use std::sync::Arc;

/// Transport, registry, clock and configuration shared by a family of
/// ports.
pub struct MessagePortContext<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    pub(super) transport: Arc<T>,
    pub(super) registry: Arc<R>,
    pub(super) clock: Arc<C>,
    pub(super) config: PortConfig,
}

impl<T, R, C> Clone for MessagePortContext<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            registry: Arc::clone(&self.registry),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<T, R, C> MessagePortContext<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a context with the default configuration.
    #[must_use]
    pub fn new(transport: Arc<T>, registry: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            transport,
            registry,
            clock,
            config: PortConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PortConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PortConfig {
        &self.config
    }

    /// Creates a port bound to this context.
    ///
    /// # Errors
    ///
    /// Returns [`super::MessagePortError::InvalidArgument`] when `name` is
    /// empty.
    pub fn port(
        &self,
        name: impl Into<String>,
        trusted: bool,
    ) -> MessagePortResult<MessagePort<T, R, C>> {
        MessagePort::new(name, trusted, self)
    }
}
