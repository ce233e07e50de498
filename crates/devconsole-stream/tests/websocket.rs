//! End-to-end: the WebSocket connector against the in-process test server

use devconsole_config::ReconnectConfig;
use devconsole_core::{ConnectionStatus, Envelope};
use devconsole_stream::{Endpoints, StreamTransport, TransportEvent, WsConnector};
use devconsole_testing::{fixtures, TestServer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

async fn wait_for<F>(events: &mut mpsc::Receiver<TransportEvent>, mut matches: F) -> TransportEvent
where
    F: FnMut(&TransportEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("condition not reached in time");
}

fn spawn_for(server: &TestServer) -> (StreamTransport, mpsc::Receiver<TransportEvent>) {
    let endpoints = Endpoints::new(&server.base_url()).unwrap();
    let connector = WsConnector::new(endpoints.stream_url().unwrap(), Duration::from_secs(5));
    StreamTransport::spawn(Arc::new(connector), ReconnectConfig::default())
}

#[tokio::test]
async fn test_websocket_roundtrip() {
    devconsole_logging::init_test();
    let server = TestServer::start(json!(fixtures::sample_snapshot(2))).await.unwrap();
    let (transport, mut events) = spawn_for(&server);

    transport.subscribe(["request", "log"]).unwrap();
    transport.connect().unwrap();
    wait_for(&mut events, |e| {
        *e == TransportEvent::Status(ConnectionStatus::Connected)
    })
    .await;

    // Queued subscribe reached the server
    eventually(|| !server.commands().is_empty()).await;
    assert_eq!(
        server.commands()[0],
        r#"{"type":"subscribe","panels":["request","log"]}"#
    );

    // Server push arrives decoded
    eventually(|| server.connected_clients() > 0).await;
    server.push_envelope("log", json!({"level": "warn", "message": "disk low"}));
    let event = wait_for(&mut events, |e| matches!(e, TransportEvent::Envelope(_))).await;
    match event {
        TransportEvent::Envelope(Envelope::Log(entry)) => assert_eq!(entry.message, "disk low"),
        other => panic!("expected log envelope, got {:?}", other),
    }

    // Snapshot on demand
    transport.request_snapshot().unwrap();
    let event = wait_for(&mut events, |e| {
        matches!(e, TransportEvent::Envelope(Envelope::Snapshot(_)))
    })
    .await;
    match event {
        TransportEvent::Envelope(Envelope::Snapshot(snapshot)) => {
            assert_eq!(snapshot.requests.len(), 2)
        }
        other => panic!("expected snapshot, got {:?}", other),
    }

    transport.close().unwrap();
    wait_for(&mut events, |e| {
        *e == TransportEvent::Status(ConnectionStatus::Disconnected)
    })
    .await;
}

#[tokio::test]
async fn test_unreachable_server_reports_failure() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoints = Endpoints::new(&format!("http://{}", addr)).unwrap();
    let connector = WsConnector::new(endpoints.stream_url().unwrap(), Duration::from_secs(2));
    let (transport, mut events) = StreamTransport::spawn(
        Arc::new(connector),
        ReconnectConfig {
            max_attempts: 0,
            ..ReconnectConfig::default()
        },
    );
    transport.connect().unwrap();

    let failure = wait_for(&mut events, |e| matches!(e, TransportEvent::Failure { .. })).await;
    assert!(matches!(failure, TransportEvent::Failure { message } if message.contains("connection")));
    wait_for(&mut events, |e| {
        *e == TransportEvent::Status(ConnectionStatus::Disconnected)
    })
    .await;
}
