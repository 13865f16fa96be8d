//! Ordered, tagged list of message observers.

use crate::port::domain::{DeliveredMessage, PortIdentity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Result returned by an observer for one delivery.
pub type ObserverResult = Result<(), ObserverError>;

/// Failure reported by an observer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("observer failed: {0}")]
pub struct ObserverError(String);

impl ObserverError {
    /// Creates an observer error with a diagnostic message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives messages delivered to a listening port.
pub trait MessageObserver: Send + Sync {
    /// Handles one delivered message.
    ///
    /// # Errors
    ///
    /// Returns [`ObserverError`] when the observer cannot handle the message.
    /// The failure is logged and does not stop later observers.
    fn message_received(&self, port: &PortIdentity, message: &DeliveredMessage) -> ObserverResult;
}

/// Adapts a closure into a [`MessageObserver`].
pub struct FnObserver<F>(F);

impl<F> FnObserver<F>
where
    F: Fn(&PortIdentity, &DeliveredMessage) -> ObserverResult + Send + Sync,
{
    /// Wraps `handler`.
    pub const fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<F> MessageObserver for FnObserver<F>
where
    F: Fn(&PortIdentity, &DeliveredMessage) -> ObserverResult + Send + Sync,
{
    fn message_received(&self, port: &PortIdentity, message: &DeliveredMessage) -> ObserverResult {
        (self.0)(port, message)
    }
}

/// Tag returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(Uuid);

impl ObserverId {
    /// Creates a new random observer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counts from one fan-out pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotifyOutcome {
    /// Observers that handled the message.
    pub succeeded: usize,
    /// Observers that returned an error or panicked.
    pub failed: usize,
}

type ObserverEntry = (ObserverId, Arc<dyn MessageObserver>);

/// Shared, ordered list of observers.
///
/// Clones share the same list. Notification works on a snapshot, so
/// observers may subscribe or unsubscribe while being notified.
#[derive(Clone, Default)]
pub struct ObserverList {
    entries: Arc<RwLock<Vec<ObserverEntry>>>,
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

impl ObserverList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer, returning its tag.
    #[must_use = "the tag is needed to remove the observer"]
    pub fn add(&self, observer: impl MessageObserver + 'static) -> ObserverId {
        let id = ObserverId::new();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Appends a closure observer, returning its tag.
    #[must_use = "the tag is needed to remove the observer"]
    pub fn add_fn<F>(&self, handler: F) -> ObserverId
    where
        F: Fn(&PortIdentity, &DeliveredMessage) -> ObserverResult + Send + Sync + 'static,
    {
        self.add(FnObserver::new(handler))
    }

    /// Removes the observer tagged `id`. Returns whether it was present.
    #[must_use]
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Returns the number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifies every observer in registration order.
    ///
    /// An observer that fails or panics is logged and skipped; the remaining
    /// observers are still notified.
    pub fn notify(&self, port: &PortIdentity, message: &DeliveredMessage) -> NotifyOutcome {
        let snapshot: Vec<ObserverEntry> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut outcome = NotifyOutcome::default();
        for (id, observer) in snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                observer.message_received(port, message)
            }));
            match result {
                Ok(Ok(())) => outcome.succeeded += 1,
                Ok(Err(err)) => {
                    outcome.failed += 1;
                    error!(port = %port, observer = %id, error = %err, "message observer failed");
                }
                Err(_) => {
                    outcome.failed += 1;
                    error!(port = %port, observer = %id, "message observer panicked");
                }
            }
        }
        outcome
    }
}
