//! Single-consumer dispatch of queued deliveries to observers.

use super::observers::{NotifyOutcome, ObserverList};
use crate::port::domain::{DeliveredMessage, PortIdentity};
use std::num::NonZeroUsize;
use tokio::sync::mpsc;
use tracing::debug;

/// Consumer side of a port's delivery queue.
///
/// The transport callback only decodes and enqueues; fan-out to observers
/// happens here, on whichever task owns the dispatcher. A port keeps its
/// dispatcher until [`MessagePort::take_dispatcher`] detaches it.
///
/// The queue has no bound; deliveries accumulate until they are drained.
///
/// [`MessagePort::take_dispatcher`]: super::MessagePort::take_dispatcher
#[derive(Debug)]
pub struct MessageDispatcher {
    identity: PortIdentity,
    inbox: mpsc::UnboundedReceiver<DeliveredMessage>,
    observers: ObserverList,
    batch_limit: NonZeroUsize,
}

impl MessageDispatcher {
    pub(super) const fn new(
        identity: PortIdentity,
        inbox: mpsc::UnboundedReceiver<DeliveredMessage>,
        observers: ObserverList,
        batch_limit: NonZeroUsize,
    ) -> Self {
        Self {
            identity,
            inbox,
            observers,
            batch_limit,
        }
    }

    /// Returns the identity of the port this dispatcher serves.
    #[must_use]
    pub const fn identity(&self) -> &PortIdentity {
        &self.identity
    }

    /// Notifies observers of every message already queued, up to the batch
    /// limit. Returns the number of messages dispatched.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while dispatched < self.batch_limit.get() {
            let Ok(message) = self.inbox.try_recv() else {
                break;
            };
            self.observers.notify(&self.identity, &message);
            dispatched += 1;
        }
        dispatched
    }

    /// Waits for the next message and notifies observers of it.
    ///
    /// Returns `None` once every producer has gone away and the queue is
    /// drained.
    pub async fn dispatch_next(&mut self) -> Option<NotifyOutcome> {
        let message = self.inbox.recv().await?;
        Some(self.observers.notify(&self.identity, &message))
    }

    /// Dispatches messages until every producer has gone away.
    pub async fn run(mut self) {
        while let Some(outcome) = self.dispatch_next().await {
            debug!(
                port = %self.identity,
                succeeded = outcome.succeeded,
                failed = outcome.failed,
                "message dispatched"
            );
        }
        debug!(port = %self.identity, "delivery queue closed");
    }
}
