//! In-memory transport adapter modelling the platform message-port service.
//!
//! Several [`InMemoryTransport`] endpoints, one per application, share an
//! [`InMemoryTransportHub`] that routes messages between them. Trusted sends
//! are authorized by comparing the signing certificates the applications
//! were created with.

use crate::port::{
    domain::{PortName, RegistrationHandle},
    ports::{DeliveryCallback, InboundMessage, OutboundMessage, PortTransport, TransportErrorCode},
};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Hard payload limit enforced by a default hub, in bytes.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4 * 1024;

/// First handle a default hub hands out.
pub const DEFAULT_FIRST_HANDLE: i32 = 1;

struct Endpoint {
    app_id: String,
    name: PortName,
    trusted: bool,
    callback: DeliveryCallback,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("app_id", &self.app_id)
            .field("name", &self.name)
            .field("trusted", &self.trusted)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct HubState {
    next_handle: i32,
    max_payload_bytes: usize,
    endpoints: HashMap<i32, Endpoint>,
    certificates: HashMap<String, String>,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            next_handle: DEFAULT_FIRST_HANDLE,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            endpoints: HashMap::new(),
            certificates: HashMap::new(),
        }
    }
}

impl HubState {
    fn find(&self, app_id: &str, name: &str, trusted: bool) -> Option<(i32, &Endpoint)> {
        self.endpoints
            .iter()
            .find(|(_, endpoint)| {
                endpoint.app_id == app_id
                    && endpoint.name.as_str() == name
                    && endpoint.trusted == trusted
            })
            .map(|(handle, endpoint)| (*handle, endpoint))
    }

    fn certificates_match(&self, first_app: &str, second_app: &str) -> bool {
        match (
            self.certificates.get(first_app),
            self.certificates.get(second_app),
        ) {
            (Some(first), Some(second)) => first == second,
            _ => false,
        }
    }
}

/// Shared routing table connecting in-memory transports.
///
/// Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransportHub {
    state: Arc<Mutex<HubState>>,
}

impl InMemoryTransportHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the next handle the hub will assign.
    #[must_use]
    pub fn with_first_handle(self, handle: i32) -> Self {
        self.lock().next_handle = handle;
        self
    }

    /// Sets the hard payload limit.
    #[must_use]
    pub fn with_max_payload_bytes(self, bytes: usize) -> Self {
        self.lock().max_payload_bytes = bytes;
        self
    }

    /// Creates a transport endpoint for an application signed with
    /// `certificate`.
    #[must_use]
    pub fn transport(
        &self,
        app_id: impl Into<String>,
        certificate: impl Into<String>,
    ) -> InMemoryTransport {
        let app_id = app_id.into();
        self.lock()
            .certificates
            .insert(app_id.clone(), certificate.into());
        InMemoryTransport {
            app_id,
            hub: self.clone(),
            counters: Arc::default(),
            failures: Arc::default(),
        }
    }

    /// Returns the number of live registrations across all applications.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.lock().endpoints.len()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add_endpoint(
        &self,
        app_id: &str,
        name: &PortName,
        trusted: bool,
        callback: DeliveryCallback,
    ) -> i32 {
        if name.as_str().is_empty() {
            return TransportErrorCode::INVALID_PARAMETER.raw();
        }

        let mut state = self.lock();
        if state.find(app_id, name.as_str(), trusted).is_some() {
            return TransportErrorCode::RESOURCE_UNAVAILABLE.raw();
        }

        let handle = state.next_handle;
        let Some(next) = handle.checked_add(1) else {
            return TransportErrorCode::OUT_OF_MEMORY.raw();
        };
        state.next_handle = next;
        state.endpoints.insert(
            handle,
            Endpoint {
                app_id: app_id.to_owned(),
                name: name.clone(),
                trusted,
                callback,
            },
        );
        handle
    }

    fn remove_endpoint(&self, app_id: &str, handle: RegistrationHandle, trusted: bool) -> i32 {
        let mut state = self.lock();
        let owned = state
            .endpoints
            .get(&handle.get())
            .is_some_and(|endpoint| endpoint.app_id == app_id && endpoint.trusted == trusted);
        if !owned {
            return TransportErrorCode::INVALID_PARAMETER.raw();
        }
        state.endpoints.remove(&handle.get());
        0
    }

    fn route(
        &self,
        app_id: &str,
        message: OutboundMessage,
    ) -> Result<(DeliveryCallback, InboundMessage), TransportErrorCode> {
        let state = self.lock();

        let sender = state
            .endpoints
            .get(&message.local_handle.get())
            .filter(|endpoint| endpoint.app_id == app_id)
            .ok_or(TransportErrorCode::INVALID_PARAMETER)?;

        if message.remote_app_id.is_empty() || message.remote_port_name.is_empty() {
            return Err(TransportErrorCode::INVALID_PARAMETER);
        }

        if message.payload.len() > state.max_payload_bytes {
            return Err(TransportErrorCode::MAX_EXCEEDED);
        }

        let (destination_handle, destination) = state
            .find(
                &message.remote_app_id,
                &message.remote_port_name,
                message.trusted,
            )
            .ok_or(TransportErrorCode::PORT_NOT_FOUND)?;

        if message.trusted && !state.certificates_match(app_id, &message.remote_app_id) {
            return Err(TransportErrorCode::CERTIFICATE_NOT_MATCH);
        }

        let inbound = InboundMessage {
            local_handle: destination_handle,
            remote_app_id: Some(app_id.to_owned()),
            remote_port_name: Some(sender.name.as_str().to_owned()),
            remote_trusted: sender.trusted,
            payload: message.payload,
        };
        Ok((Arc::clone(&destination.callback), inbound))
    }

    fn callback_for(&self, app_id: &str, handle: RegistrationHandle) -> Option<DeliveryCallback> {
        self.lock()
            .endpoints
            .get(&handle.get())
            .filter(|endpoint| endpoint.app_id == app_id)
            .map(|endpoint| Arc::clone(&endpoint.callback))
    }
}

/// Number of calls made to each transport primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportCallCounts {
    /// Calls to `register`.
    pub register: usize,
    /// Calls to `unregister`.
    pub unregister: usize,
    /// Calls to `send`.
    pub send: usize,
}

#[derive(Debug, Default)]
struct CallCounters {
    register: AtomicUsize,
    unregister: AtomicUsize,
    send: AtomicUsize,
}

#[derive(Debug, Default)]
struct FailurePlan {
    register: Option<TransportErrorCode>,
    unregister: Option<TransportErrorCode>,
    send: Option<TransportErrorCode>,
}

/// In-memory transport endpoint for one application.
///
/// Deliveries run synchronously on the sending thread, after the hub lock
/// has been released, so callbacks may call back into the transport.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    app_id: String,
    hub: InMemoryTransportHub,
    counters: Arc<CallCounters>,
    failures: Arc<Mutex<FailurePlan>>,
}

impl InMemoryTransport {
    /// Creates a transport on a private hub, signed with a certificate
    /// unique to `app_id`.
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        let certificate = format!("cert:{app_id}");
        InMemoryTransportHub::new().transport(app_id, certificate)
    }

    /// Returns the application identifier this endpoint sends as.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the hub this endpoint is connected to.
    #[must_use]
    pub const fn hub(&self) -> &InMemoryTransportHub {
        &self.hub
    }

    /// Returns how often each primitive has been called on this endpoint.
    #[must_use]
    pub fn call_counts(&self) -> TransportCallCounts {
        TransportCallCounts {
            register: self.counters.register.load(Ordering::Relaxed),
            unregister: self.counters.unregister.load(Ordering::Relaxed),
            send: self.counters.send.load(Ordering::Relaxed),
        }
    }

    /// Makes the next `register` call fail with `code`.
    pub fn fail_next_register(&self, code: TransportErrorCode) {
        self.plan().register = Some(code);
    }

    /// Makes the next `unregister` call fail with `code`.
    pub fn fail_next_unregister(&self, code: TransportErrorCode) {
        self.plan().unregister = Some(code);
    }

    /// Makes the next `send` call fail with `code`.
    pub fn fail_next_send(&self, code: TransportErrorCode) {
        self.plan().send = Some(code);
    }

    /// Delivers a synthetic message to one of this application's ports.
    ///
    /// Returns `false` when `handle` is not a live registration of this
    /// application.
    #[must_use]
    pub fn inject(&self, handle: RegistrationHandle, mut message: InboundMessage) -> bool {
        let Some(callback) = self.hub.callback_for(&self.app_id, handle) else {
            return false;
        };
        message.local_handle = handle.get();
        callback(message);
        true
    }

    fn plan(&self) -> MutexGuard<'_, FailurePlan> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PortTransport for InMemoryTransport {
    fn register(&self, name: &PortName, trusted: bool, callback: DeliveryCallback) -> i32 {
        self.counters.register.fetch_add(1, Ordering::Relaxed);
        if let Some(code) = self.plan().register.take() {
            return code.raw();
        }
        self.hub.add_endpoint(&self.app_id, name, trusted, callback)
    }

    fn unregister(&self, handle: RegistrationHandle, trusted: bool) -> i32 {
        self.counters.unregister.fetch_add(1, Ordering::Relaxed);
        if let Some(code) = self.plan().unregister.take() {
            return code.raw();
        }
        self.hub.remove_endpoint(&self.app_id, handle, trusted)
    }

    fn send(&self, message: OutboundMessage) -> i32 {
        self.counters.send.fetch_add(1, Ordering::Relaxed);
        if let Some(code) = self.plan().send.take() {
            return code.raw();
        }
        match self.hub.route(&self.app_id, message) {
            Ok((callback, inbound)) => {
                callback(inbound);
                0
            }
            Err(code) => code.raw(),
        }
    }
}
