//! Scoped listening session.

use super::message_port::{MessagePort, MessagePortResult};
use crate::port::ports::{PortRegistry, PortTransport};
use mockable::Clock;
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Keeps a port listening for the guard's lifetime.
///
/// Created by [`MessagePort::listen_scoped`]. Dropping the guard stops
/// listening on every exit path; [`ListeningGuard::finish`] does the same
/// but reports failures. The port itself stays usable afterwards.
pub struct ListeningGuard<'port, T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    port: &'port mut MessagePort<T, R, C>,
}

impl<'port, T, R, C> ListeningGuard<'port, T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    pub(super) const fn new(port: &'port mut MessagePort<T, R, C>) -> Self {
        Self { port }
    }

    /// Stops listening now.
    ///
    /// # Errors
    ///
    /// Returns the failure from [`MessagePort::stop_listening`]; the drop
    /// that follows retries once more and only logs.
    pub fn finish(self) -> MessagePortResult<()> {
        if self.port.is_listening() {
            self.port.stop_listening()?;
        }
        Ok(())
    }
}

impl<T, R, C> Deref for ListeningGuard<'_, T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    type Target = MessagePort<T, R, C>;

    fn deref(&self) -> &Self::Target {
        &*self.port
    }
}

impl<T, R, C> DerefMut for ListeningGuard<'_, T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.port
    }
}

impl<T, R, C> Drop for ListeningGuard<'_, T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.port.is_listening()
            && let Err(err) = self.port.stop_listening()
        {
            warn!(port = %self.port.identity(), error = %err, "scoped stop on drop failed");
        }
    }
}
