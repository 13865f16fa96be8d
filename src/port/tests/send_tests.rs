//! Outbound message behaviour of message ports.

use std::sync::Arc;

use super::helpers::{APP_ID, TestContext, context, context_on, listening_port};
use crate::port::{
    adapters::memory::{InMemoryPortRegistry, InMemoryTransportHub},
    config::PortConfig,
    domain::{Bundle, RemotePort},
    ports::TransportErrorCode,
    services::{MessagePortContext, MessagePortError},
};
use mockable::DefaultClock;
use rstest::rstest;

fn oversized_bundle() -> Bundle {
    Bundle::new().with_string("blob", "x".repeat(64))
}

#[rstest]
fn send_requires_a_listening_port(context: TestContext) {
    let port = context.port("svc.local", false).expect("valid port");

    let result = port.send(
        &Bundle::new().with_string("k", "v"),
        &RemotePort::new(APP_ID, "svc.local"),
    );

    assert!(matches!(result, Err(MessagePortError::NotListening(_))));
    assert_eq!(context.transport().call_counts().send, 0);
}

#[rstest]
fn send_to_own_port_succeeds(context: TestContext) {
    let port = listening_port(&context, "svc.local");

    port.send(
        &Bundle::new().with_string("k", "v"),
        &RemotePort::new(APP_ID, "svc.local"),
    )
    .expect("send should succeed");

    assert_eq!(context.transport().call_counts().send, 1);
}

#[test]
fn hard_limit_rejection_is_message_too_large() {
    let hub = InMemoryTransportHub::new().with_max_payload_bytes(32);
    let context = context_on(&hub, PortConfig::default());
    let port = listening_port(&context, "svc.local");

    let encoded_len = oversized_bundle()
        .encode()
        .expect("bundle should encode")
        .len();

    let err = port
        .send(&oversized_bundle(), &RemotePort::new(APP_ID, "svc.local"))
        .expect_err("hub should refuse the payload");

    assert!(matches!(
        err,
        MessagePortError::MessageTooLarge {
            actual_bytes,
            limit_bytes: None,
        } if actual_bytes == encoded_len
    ));
    assert_eq!(
        err.to_string(),
        format!("message of {encoded_len} bytes exceeds the transport size limit")
    );
    assert!(port.is_listening());
}

#[test]
fn strict_config_rejects_before_reaching_transport() {
    let hub = InMemoryTransportHub::new();
    let context = context_on(&hub, PortConfig::strict().with_max_payload_bytes(32));
    let port = listening_port(&context, "svc.local");

    let err = port
        .send(&oversized_bundle(), &RemotePort::new(APP_ID, "svc.local"))
        .expect_err("strict config should refuse the payload");

    assert!(matches!(
        err,
        MessagePortError::MessageTooLarge {
            limit_bytes: Some(32),
            ..
        }
    ));
    assert!(err.to_string().ends_with("exceeds the 32 byte limit"));
    assert_eq!(context.transport().call_counts().send, 0);
}

#[test]
fn lenient_config_forwards_payloads_above_soft_limit() {
    let hub = InMemoryTransportHub::new();
    let context = context_on(&hub, PortConfig::default().with_max_payload_bytes(32));
    let port = listening_port(&context, "svc.local");

    port.send(&oversized_bundle(), &RemotePort::new(APP_ID, "svc.local"))
        .expect("soft limit should only warn");

    assert_eq!(context.transport().call_counts().send, 1);
}

#[rstest]
fn transport_failure_leaves_port_listening(context: TestContext) {
    let port = listening_port(&context, "svc.local");

    let result = port.send(
        &Bundle::new().with_string("k", "v"),
        &RemotePort::new(APP_ID, "missing"),
    );

    assert!(matches!(
        result,
        Err(MessagePortError::Transport(TransportErrorCode::PORT_NOT_FOUND))
    ));
    assert!(port.is_listening());
}

#[test]
fn remote_trust_is_independent_of_local_trust() {
    let hub = InMemoryTransportHub::new();
    let context = context_on(&hub, PortConfig::default());
    let sender = listening_port(&context, "client");
    let mut receiver = context.port("svc.secure", true).expect("valid port");
    receiver.listen().expect("listen should succeed");

    sender
        .send(
            &Bundle::new().with_string("k", "v"),
            &RemotePort::new(APP_ID, "svc.secure").trusted(),
        )
        .expect("untrusted port may address a trusted remote");

    let untrusted_miss = sender.send(
        &Bundle::new(),
        &RemotePort::new(APP_ID, "svc.secure"),
    );
    assert!(matches!(
        untrusted_miss,
        Err(MessagePortError::Transport(TransportErrorCode::PORT_NOT_FOUND))
    ));
}

#[test]
fn trusted_send_across_certificates_is_refused() {
    let hub = InMemoryTransportHub::new();
    let context = context_on(&hub, PortConfig::default());
    let sender = listening_port(&context, "client");
    let stranger = hub.transport("org.example.stranger", "cert-b");
    let stranger_context = MessagePortContext::new(
        Arc::new(stranger),
        Arc::new(InMemoryPortRegistry::new()),
        Arc::new(DefaultClock),
    );
    let mut remote = stranger_context.port("svc.secure", true).expect("valid port");
    remote.listen().expect("listen should succeed");

    let result = sender.send(
        &Bundle::new(),
        &RemotePort::new("org.example.stranger", "svc.secure").trusted(),
    );

    assert!(matches!(
        result,
        Err(MessagePortError::Transport(TransportErrorCode::CERTIFICATE_NOT_MATCH))
    ));
}
