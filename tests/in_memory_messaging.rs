//! Integration tests for message exchange over the in-memory transport.
//!
//! Two applications share one transport hub and talk to each other through
//! their own ports, exercising registration, routing, trust checks and both
//! dispatch styles end to end.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use mockable::DefaultClock;
use msgport::port::{
    adapters::memory::{InMemoryPortRegistry, InMemoryTransport, InMemoryTransportHub},
    domain::{Bundle, DeliveredMessage, PortIdentity, RemotePort},
    ports::TransportErrorCode,
    services::{MessagePortContext, MessagePortError, ObserverError, ObserverResult},
};
use tokio::sync::mpsc;

const CLIENT_APP: &str = "org.example.client";
const SERVER_APP: &str = "org.example.server";

type Context = MessagePortContext<InMemoryTransport, InMemoryPortRegistry, DefaultClock>;

fn app_context(hub: &InMemoryTransportHub, app_id: &str, certificate: &str) -> Context {
    MessagePortContext::new(
        Arc::new(hub.transport(app_id, certificate)),
        Arc::new(InMemoryPortRegistry::new()),
        Arc::new(DefaultClock),
    )
}

fn forward_to(
    tx: mpsc::UnboundedSender<DeliveredMessage>,
) -> impl Fn(&PortIdentity, &DeliveredMessage) -> ObserverResult + Send + Sync + 'static {
    move |_: &PortIdentity, message: &DeliveredMessage| {
        tx.send(message.clone())
            .map_err(|err| ObserverError::new(err.to_string()))
    }
}

/// A request from the client is answered on the reply port it carried.
#[test]
fn request_and_reply_between_applications() {
    let hub = InMemoryTransportHub::new();
    let client = app_context(&hub, CLIENT_APP, "cert-client");
    let server = app_context(&hub, SERVER_APP, "cert-server");

    let (server_tx, mut server_rx) = mpsc::unbounded_channel();
    let mut server_port = server.port("svc.echo", false).expect("server port");
    let _observer = server_port.subscribe_fn(forward_to(server_tx));
    server_port.listen().expect("server listen");

    let (client_tx, mut client_rx) = mpsc::unbounded_channel();
    let mut client_port = client.port("svc.reply", false).expect("client port");
    let _client_observer = client_port.subscribe_fn(forward_to(client_tx));
    client_port.listen().expect("client listen");

    client_port
        .send(
            &Bundle::new().with_string("greeting", "hello"),
            &RemotePort::new(SERVER_APP, "svc.echo"),
        )
        .expect("request should be routed");
    assert_eq!(server_port.dispatch_pending(), 1);

    let request = server_rx.try_recv().expect("server should observe the request");
    assert_eq!(request.payload().get_string("greeting"), Some("hello"));
    let sender = request.sender().expect("request should carry a reply port");
    assert_eq!(sender.app_id(), Some(CLIENT_APP));
    assert_eq!(sender.port_name(), "svc.reply");

    let reply_to = RemotePort::new(
        sender.app_id().expect("sender app id"),
        sender.port_name(),
    );
    server_port
        .send(&Bundle::new().with_string("greeting", "hello back"), &reply_to)
        .expect("reply should be routed");
    assert_eq!(client_port.dispatch_pending(), 1);

    let reply = client_rx.try_recv().expect("client should observe the reply");
    assert_eq!(reply.payload().get_string("greeting"), Some("hello back"));

    client_port.close().expect("client close");
    server_port.close().expect("server close");
    assert_eq!(hub.endpoint_count(), 0);
}

/// Trusted ports only accept senders signed with the same certificate.
#[test]
fn trusted_ports_require_a_shared_certificate() {
    let hub = InMemoryTransportHub::new();
    let server = app_context(&hub, SERVER_APP, "cert-shared");
    let sibling = app_context(&hub, CLIENT_APP, "cert-shared");
    let stranger = app_context(&hub, "org.example.stranger", "cert-other");

    let mut server_port = server.port("svc.secure", true).expect("server port");
    server_port.listen().expect("server listen");
    let mut sibling_port = sibling.port("svc.sibling", false).expect("sibling port");
    sibling_port.listen().expect("sibling listen");
    let mut stranger_port = stranger.port("svc.stranger", false).expect("stranger port");
    stranger_port.listen().expect("stranger listen");

    let target = RemotePort::new(SERVER_APP, "svc.secure").trusted();
    sibling_port
        .send(&Bundle::new().with_string("k", "v"), &target)
        .expect("same certificate should be accepted");
    let refused = stranger_port.send(&Bundle::new().with_string("k", "v"), &target);

    assert!(matches!(
        refused,
        Err(MessagePortError::Transport(code)) if code == TransportErrorCode::CERTIFICATE_NOT_MATCH
    ));
    assert_eq!(server_port.dispatch_pending(), 1);
    assert!(stranger_port.is_listening());
}

/// Messages to a port that stopped listening are reported as undeliverable.
#[test]
fn stopped_ports_are_unreachable() {
    let hub = InMemoryTransportHub::new();
    let client = app_context(&hub, CLIENT_APP, "cert-client");
    let server = app_context(&hub, SERVER_APP, "cert-server");

    let mut server_port = server.port("svc.echo", false).expect("server port");
    server_port.listen().expect("server listen");
    server_port.stop_listening().expect("server stop");
    let mut client_port = client.port("svc.reply", false).expect("client port");
    client_port.listen().expect("client listen");

    let result = client_port.send(
        &Bundle::new().with_string("k", "v"),
        &RemotePort::new(SERVER_APP, "svc.echo"),
    );

    assert!(matches!(
        result,
        Err(MessagePortError::Transport(code)) if code == TransportErrorCode::PORT_NOT_FOUND
    ));
}

/// A detached dispatcher delivers on its own task and ends with the port.
#[tokio::test(flavor = "multi_thread")]
async fn detached_dispatcher_runs_until_the_port_closes() {
    let hub = InMemoryTransportHub::new();
    let client = app_context(&hub, CLIENT_APP, "cert-client");
    let server = app_context(&hub, SERVER_APP, "cert-server");

    let (server_tx, mut server_rx) = mpsc::unbounded_channel();
    let mut server_port = server.port("svc.echo", false).expect("server port");
    let _observer = server_port.subscribe_fn(forward_to(server_tx));
    server_port.listen().expect("server listen");
    let dispatcher = server_port
        .take_dispatcher()
        .expect("dispatcher should be attached");
    let task = tokio::spawn(dispatcher.run());

    let mut client_port = client.port("svc.reply", false).expect("client port");
    client_port.listen().expect("client listen");
    for index in 0..3 {
        client_port
            .send(
                &Bundle::new().with_string("index", index.to_string()),
                &RemotePort::new(SERVER_APP, "svc.echo"),
            )
            .expect("request should be routed");
    }

    let mut received = Vec::new();
    for _ in 0..3 {
        let message = server_rx.recv().await.expect("message should arrive");
        received.push(message.payload().get_string("index").map(str::to_owned));
    }
    assert_eq!(
        received,
        vec![Some("0".to_owned()), Some("1".to_owned()), Some("2".to_owned())]
    );

    server_port.close().expect("server close");
    task.await.expect("dispatcher task should finish");
    client_port.close().expect("client close");
}
