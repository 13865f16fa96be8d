//! Shared fixtures for message port service tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::port::{
    adapters::memory::{InMemoryPortRegistry, InMemoryTransport, InMemoryTransportHub},
    config::PortConfig,
    domain::{DeliveredMessage, PortIdentity, PortName},
    ports::InboundMessage,
    services::{MessagePort, MessagePortContext},
};
use mockable::DefaultClock;
use rstest::fixture;

pub const APP_ID: &str = "org.example.app";

pub type TestContext = MessagePortContext<InMemoryTransport, InMemoryPortRegistry, DefaultClock>;
pub type TestPort = MessagePort<InMemoryTransport, InMemoryPortRegistry, DefaultClock>;

pub fn context_on(hub: &InMemoryTransportHub, config: PortConfig) -> TestContext {
    MessagePortContext::new(
        Arc::new(hub.transport(APP_ID, "cert-a")),
        Arc::new(InMemoryPortRegistry::new()),
        Arc::new(DefaultClock),
    )
    .with_config(config)
}

#[fixture]
pub fn context() -> TestContext {
    context_on(
        &InMemoryTransportHub::new().with_first_handle(7),
        PortConfig::default(),
    )
}

pub fn identity(name: &str, trusted: bool) -> PortIdentity {
    PortIdentity::new(PortName::new(name).expect("valid name"), trusted)
}

pub fn listening_port(context: &TestContext, name: &str) -> TestPort {
    let mut port = context.port(name, false).expect("valid port name");
    port.listen().expect("listen should succeed");
    port
}

pub fn inbound(payload: Vec<u8>) -> InboundMessage {
    InboundMessage {
        local_handle: 0,
        remote_app_id: None,
        remote_port_name: None,
        remote_trusted: false,
        payload,
    }
}

/// Collects `(observer index, message)` pairs in notification order.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<(usize, DeliveredMessage)>>>,
}

impl Recorder {
    pub fn record(&self, index: usize, message: &DeliveredMessage) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((index, message.clone()));
    }

    pub fn seen(&self) -> Vec<(usize, DeliveredMessage)> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
