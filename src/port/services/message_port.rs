//! The message port handle: listen, stop listening, send.

use super::context::MessagePortContext;
use super::dispatch::MessageDispatcher;
use super::guard::ListeningGuard;
use super::observers::{MessageObserver, ObserverId, ObserverList, ObserverResult};
use crate::port::{
    config::PortConfig,
    domain::{
        Bundle, DeliveredMessage, MessageSender, PortDomainError, PortIdentity, PortName,
        RegistrationHandle, RemotePort,
    },
    ports::{
        DeliveryCallback, InboundMessage, OutboundMessage, PortRegistry, PortRegistryError,
        PortTransport, TransportErrorCode,
    },
};
use mockable::Clock;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors returned by message port operations.
#[derive(Debug, Error)]
pub enum MessagePortError {
    /// Construction input was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(PortDomainError),

    /// The identity already has an active registration in this process.
    #[error("port {0} is already listening")]
    AlreadyListening(PortIdentity),

    /// The operation requires a listening port.
    #[error("port {0} is not listening")]
    NotListening(PortIdentity),

    /// The payload exceeds a size limit.
    #[error("message of {actual_bytes} bytes exceeds {}", describe_limit(.limit_bytes.as_ref()))]
    MessageTooLarge {
        /// Encoded payload size.
        actual_bytes: usize,
        /// Locally configured limit that rejected the payload, or `None`
        /// when the transport rejected it against its own hard limit.
        limit_bytes: Option<usize>,
    },

    /// The platform transport reported a failure.
    #[error("transport error: {0}")]
    Transport(TransportErrorCode),

    /// The port registry failed.
    #[error(transparent)]
    Registry(#[from] PortRegistryError),

    /// The payload bundle could not be encoded.
    #[error("payload error: {0}")]
    Payload(PortDomainError),
}

fn describe_limit(limit_bytes: Option<&usize>) -> String {
    limit_bytes.map_or_else(
        || "the transport size limit".to_owned(),
        |limit| format!("the {limit} byte limit"),
    )
}

/// Result type for message port operations.
pub type MessagePortResult<T> = Result<T, MessagePortError>;

#[derive(Debug)]
struct Registration {
    handle: RegistrationHandle,
    active: Arc<AtomicBool>,
}

/// A named local message port.
///
/// A port is created idle. [`MessagePort::listen`] registers it with the
/// transport and the registry; inbound messages are then decoded by the
/// transport callback, queued, and handed to observers by the port's
/// dispatcher. Equality and hashing follow [`PortIdentity`] only.
///
/// The delivery queue is unbounded. While listening, the owner must drain
/// it, either by calling [`MessagePort::dispatch_pending`] regularly or by
/// running the detached [`MessageDispatcher`] on a task.
///
/// Dropping a listening port stops listening on a best-effort basis; use
/// [`MessagePort::close`] to observe failures.
pub struct MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    identity: PortIdentity,
    transport: Arc<T>,
    registry: Arc<R>,
    clock: Arc<C>,
    config: PortConfig,
    registration: Option<Registration>,
    observers: ObserverList,
    inbox: mpsc::UnboundedSender<DeliveredMessage>,
    dispatcher: Option<MessageDispatcher>,
}

impl<T, R, C> MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an idle port. The transport is not contacted.
    ///
    /// # Errors
    ///
    /// Returns [`MessagePortError::InvalidArgument`] when `name` is empty.
    pub fn new(
        name: impl Into<String>,
        trusted: bool,
        context: &MessagePortContext<T, R, C>,
    ) -> MessagePortResult<Self> {
        let port_name = PortName::new(name).map_err(MessagePortError::InvalidArgument)?;
        let identity = PortIdentity::new(port_name, trusted);
        let observers = ObserverList::new();
        let (inbox, receiver) = mpsc::unbounded_channel();
        let dispatcher = MessageDispatcher::new(
            identity.clone(),
            receiver,
            observers.clone(),
            context.config.dispatch_batch_limit,
        );

        Ok(Self {
            identity,
            transport: Arc::clone(&context.transport),
            registry: Arc::clone(&context.registry),
            clock: Arc::clone(&context.clock),
            config: context.config.clone(),
            registration: None,
            observers,
            inbox,
            dispatcher: Some(dispatcher),
        })
    }

    /// Returns the port identity.
    #[must_use]
    pub const fn identity(&self) -> &PortIdentity {
        &self.identity
    }

    /// Returns the local port name.
    #[must_use]
    pub const fn port_name(&self) -> &PortName {
        self.identity.name()
    }

    /// Returns whether the port lives in the trusted namespace.
    #[must_use]
    pub const fn trusted(&self) -> bool {
        self.identity.trusted()
    }

    /// Returns whether the port is currently listening.
    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.registration.is_some()
    }

    /// Returns the transport handle while listening.
    #[must_use]
    pub fn handle(&self) -> Option<RegistrationHandle> {
        self.registration.as_ref().map(|registration| registration.handle)
    }

    /// Registers the port with the registry and the transport.
    ///
    /// # Errors
    ///
    /// Returns [`MessagePortError::AlreadyListening`] without calling the
    /// transport when the identity is already registered (by this or any
    /// other port), or [`MessagePortError::Transport`] when the transport
    /// rejects the registration. On failure the port stays idle and may be
    /// retried.
    pub fn listen(&mut self) -> MessagePortResult<()> {
        if self.is_listening() {
            return Err(MessagePortError::AlreadyListening(self.identity.clone()));
        }

        match self.registry.register(&self.identity) {
            Ok(()) => {}
            Err(PortRegistryError::AlreadyRegistered(identity)) => {
                return Err(MessagePortError::AlreadyListening(identity));
            }
            Err(err) => return Err(err.into()),
        }

        let active = Arc::new(AtomicBool::new(true));
        let callback = self.delivery_callback(Arc::clone(&active));
        let raw = self.transport.register(
            self.identity.name(),
            self.identity.trusted(),
            callback,
        );

        let Some(handle) = RegistrationHandle::from_raw(raw) else {
            active.store(false, Ordering::Release);
            self.release_registry_entry();
            let code = TransportErrorCode::from_failed_registration(raw);
            debug!(port = %self.identity, code = code.raw(), "port registration rejected");
            return Err(MessagePortError::Transport(code));
        };

        debug!(port = %self.identity, handle = handle.get(), "port listening");
        self.registration = Some(Registration { handle, active });
        Ok(())
    }

    /// Starts listening and returns a guard that stops listening when
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`MessagePort::listen`].
    pub fn listen_scoped(&mut self) -> MessagePortResult<ListeningGuard<'_, T, R, C>> {
        self.listen()?;
        Ok(ListeningGuard::new(self))
    }

    /// Unregisters the port from the transport and the registry.
    ///
    /// # Errors
    ///
    /// Returns [`MessagePortError::NotListening`] without calling the
    /// transport when the port is idle, or [`MessagePortError::Transport`]
    /// when the transport refuses; in that case the port keeps listening
    /// and its registry entry is kept. Once the transport has released the
    /// handle the stop is complete; a registry that cannot drop the entry is
    /// only logged.
    pub fn stop_listening(&mut self) -> MessagePortResult<()> {
        let Some(registration) = self.registration.as_ref() else {
            return Err(MessagePortError::NotListening(self.identity.clone()));
        };

        let status = self
            .transport
            .unregister(registration.handle, self.identity.trusted());
        if let Some(code) = TransportErrorCode::from_status(status) {
            debug!(port = %self.identity, code = code.raw(), "port unregistration rejected");
            return Err(MessagePortError::Transport(code));
        }

        if let Some(stopped) = self.registration.take() {
            stopped.active.store(false, Ordering::Release);
            debug!(port = %self.identity, handle = stopped.handle.get(), "port stopped listening");
        }

        self.release_registry_entry();
        Ok(())
    }

    /// Stops listening if needed and consumes the port.
    ///
    /// # Errors
    ///
    /// Returns the transport failure from stopping. The port is still
    /// dropped, which retries the stop on a best-effort basis.
    pub fn close(mut self) -> MessagePortResult<()> {
        if self.is_listening() {
            self.stop_listening()?;
        }
        Ok(())
    }

    /// Sends `payload` to `remote`, using this port as the reply address.
    ///
    /// # Errors
    ///
    /// Returns [`MessagePortError::NotListening`] without calling the
    /// transport when the port is idle, [`MessagePortError::MessageTooLarge`]
    /// when the transport (or a strict configuration) rejects the payload
    /// size, [`MessagePortError::Payload`] when encoding fails, or
    /// [`MessagePortError::Transport`] for other transport failures.
    pub fn send(&self, payload: &Bundle, remote: &RemotePort) -> MessagePortResult<()> {
        let handle = self
            .handle()
            .ok_or_else(|| MessagePortError::NotListening(self.identity.clone()))?;

        let encoded = payload.encode().map_err(MessagePortError::Payload)?;
        let actual_bytes = encoded.len();
        if actual_bytes > self.config.max_payload_bytes {
            if self.config.enforce_payload_limit {
                return Err(MessagePortError::MessageTooLarge {
                    actual_bytes,
                    limit_bytes: Some(self.config.max_payload_bytes),
                });
            }
            warn!(
                port = %self.identity,
                remote = %remote,
                bytes = actual_bytes,
                limit = self.config.max_payload_bytes,
                "payload exceeds recommended size"
            );
        }

        let status = self.transport.send(OutboundMessage {
            remote_app_id: remote.app_id().to_owned(),
            remote_port_name: remote.port_name().to_owned(),
            local_handle: handle,
            trusted: remote.is_trusted(),
            payload: encoded,
        });

        match TransportErrorCode::from_status(status) {
            None => {
                debug!(port = %self.identity, remote = %remote, bytes = actual_bytes, "message sent");
                Ok(())
            }
            Some(code) if code.is_max_exceeded() => Err(MessagePortError::MessageTooLarge {
                actual_bytes,
                limit_bytes: None,
            }),
            Some(code) => Err(MessagePortError::Transport(code)),
        }
    }

    /// Adds an observer, notified after every observer added before it.
    #[must_use = "the tag is needed to unsubscribe"]
    pub fn subscribe(&self, observer: impl MessageObserver + 'static) -> ObserverId {
        self.observers.add(observer)
    }

    /// Adds a closure observer.
    #[must_use = "the tag is needed to unsubscribe"]
    pub fn subscribe_fn<F>(&self, handler: F) -> ObserverId
    where
        F: Fn(&PortIdentity, &DeliveredMessage) -> ObserverResult + Send + Sync + 'static,
    {
        self.observers.add_fn(handler)
    }

    /// Removes an observer. Returns whether it was subscribed.
    #[must_use]
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Returns the number of subscribed observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Hands queued deliveries to observers. Returns the number dispatched,
    /// which is always zero once the dispatcher has been detached.
    pub fn dispatch_pending(&mut self) -> usize {
        self.dispatcher
            .as_mut()
            .map_or(0, MessageDispatcher::dispatch_pending)
    }

    /// Detaches the dispatcher so it can run on its own task.
    ///
    /// Returns `None` if it was already taken.
    pub fn take_dispatcher(&mut self) -> Option<MessageDispatcher> {
        self.dispatcher.take()
    }

    fn delivery_callback(&self, active: Arc<AtomicBool>) -> DeliveryCallback {
        let identity = self.identity.clone();
        let inbox = self.inbox.clone();
        let clock = Arc::clone(&self.clock);

        Arc::new(move |inbound: InboundMessage| {
            if !active.load(Ordering::Acquire) {
                warn!(port = %identity, handle = inbound.local_handle, "dropping delivery for stopped registration");
                return;
            }

            let message = match decode_delivery(inbound, &*clock) {
                Ok(message) => message,
                Err(err) => {
                    warn!(port = %identity, error = %err, "dropping undecodable delivery");
                    return;
                }
            };

            if inbox.send(message).is_err() {
                debug!(port = %identity, "dispatcher gone; delivery discarded");
            }
        })
    }

    fn release_registry_entry(&self) {
        match self.registry.unregister(&self.identity) {
            Ok(()) => {}
            Err(PortRegistryError::NotRegistered(identity)) => {
                warn!(port = %identity, "listening port was missing from the registry");
            }
            Err(err) => {
                warn!(port = %self.identity, error = %err, "failed to release registry entry");
            }
        }
    }
}

fn decode_delivery(
    inbound: InboundMessage,
    clock: &impl Clock,
) -> Result<DeliveredMessage, PortDomainError> {
    let payload = Bundle::decode(&inbound.payload)?;
    let sender = inbound
        .remote_port_name
        .filter(|name| !name.is_empty())
        .map(|port_name| {
            let app_id = inbound.remote_app_id.filter(|app| !app.is_empty());
            MessageSender::new(app_id, port_name, inbound.remote_trusted)
        });
    Ok(DeliveredMessage::new(payload, sender, clock))
}

impl<T, R, C> Drop for MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if self.is_listening()
            && let Err(err) = self.stop_listening()
        {
            warn!(port = %self.identity, error = %err, "implicit stop on drop failed");
        }
    }
}

impl<T, R, C> PartialEq for MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<T, R, C> Eq for MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
}

impl<T, R, C> Hash for MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl<T, R, C> std::fmt::Debug for MessagePort<T, R, C>
where
    T: PortTransport,
    R: PortRegistry,
    C: Clock + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePort")
            .field("identity", &self.identity)
            .field("handle", &self.handle())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
