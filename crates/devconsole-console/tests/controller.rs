//! Session tests: scripted socket, in-process HTTP server, real store

use devconsole_config::{ConsoleSection, ReconnectConfig};
use devconsole_console::{
    ConsoleController, MemoryNotifier, NoticeLevel, PanelStore, SnapshotClient,
};
use devconsole_core::{Command, ConnectionStatus};
use devconsole_stream::Endpoints;
use devconsole_testing::{fixtures, MockConnector, MockOutcome, TestServer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

fn fast_reconnect(max_attempts: u32) -> ReconnectConfig {
    ReconnectConfig {
        base_delay_ms: 5,
        max_delay_ms: 20,
        max_attempts,
        ..ReconnectConfig::default()
    }
}

fn section(panels: &[&str]) -> ConsoleSection {
    ConsoleSection {
        panels: panels.iter().map(|p| p.to_string()).collect(),
        ..ConsoleSection::default()
    }
}

fn http_client(server: &TestServer) -> SnapshotClient {
    SnapshotClient::new(Endpoints::new(&server.base_url()).unwrap(), WAIT).unwrap()
}

async fn wait_until(controller: &ConsoleController, mut check: impl FnMut(&PanelStore) -> bool) {
    let mut render = controller.render_watch();
    tokio::time::timeout(WAIT, async {
        loop {
            if controller.read(&mut check) {
                return;
            }
            render.changed().await.expect("console stopped");
        }
    })
    .await
    .expect("timed out waiting for store state");
}

async fn wait_for_status(controller: &ConsoleController, status: ConnectionStatus) {
    let mut watch = controller.status_watch();
    tokio::time::timeout(WAIT, watch.wait_for(|s| *s == status))
        .await
        .expect("timed out waiting for status")
        .expect("transport stopped");
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

// ============================================================================
// Hydration and live events
// ============================================================================

#[tokio::test]
async fn test_hydrates_then_applies_live_events() {
    devconsole_logging::init_test();
    let server = TestServer::start(json!(fixtures::sample_snapshot(2))).await.unwrap();
    let connector = MockConnector::new();
    let notifier = MemoryNotifier::new();

    let controller = ConsoleController::spawn(
        &section(&["requests", "sql", "logs"]),
        fast_reconnect(8),
        connector.clone(),
        Some(http_client(&server)),
        notifier.clone(),
    );

    wait_for_status(&controller, ConnectionStatus::Connected).await;
    wait_until(&controller, |s| s.requests().len() == 2).await;
    assert_eq!(controller.stats().snapshots_applied, 1);

    // Configured panels are subscribed on open
    let subscribe = Command::subscribe(["requests", "sql", "logs"]).to_json().unwrap();
    eventually(|| connector.sent_frames().contains(&subscribe)).await;

    assert!(connector.inject(fixtures::request_frame("POST", "/orders", 201)));
    wait_until(&controller, |s| s.requests().len() == 3).await;

    let stats = controller.stats();
    assert_eq!(stats.event_count, 1);
    assert!(stats.last_event_at.is_some());
    assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
}

#[tokio::test]
async fn test_failed_hydration_starts_empty() {
    let server = TestServer::start(json!(fixtures::sample_snapshot(2))).await.unwrap();
    server.fail_snapshot(true);
    let connector = MockConnector::new();

    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        Some(http_client(&server)),
        MemoryNotifier::new(),
    );

    wait_for_status(&controller, ConnectionStatus::Connected).await;
    assert!(controller.snapshot().is_empty());
    assert_eq!(controller.stats().snapshots_applied, 0);

    assert!(connector.inject(fixtures::envelope_frame("log", json!({"message": "up"}))));
    wait_until(&controller, |s| s.logs().len() == 1).await;
}

#[tokio::test]
async fn test_pushed_snapshot_replaces_state() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    for i in 0..5 {
        connector.inject(fixtures::request_frame("GET", &format!("/r/{}", i), 200));
    }
    wait_until(&controller, |s| s.requests().len() == 5).await;

    let frame = fixtures::envelope_frame(
        "snapshot",
        json!({"requests": [{"path": "/a"}, {"path": "/b"}, {"path": "/c"}], "sql": []}),
    );
    connector.inject(frame.clone());
    wait_until(&controller, |s| s.stats().snapshots_applied == 1).await;
    let first = controller.read(|s| s.clone());
    assert_eq!(first.requests().len(), 3);

    connector.inject(frame);
    wait_until(&controller, |s| s.stats().snapshots_applied == 2).await;
    assert_eq!(controller.read(|s| s.clone()), first);
}

#[tokio::test]
async fn test_unknown_types_follow_panel_list() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &section(&["requests", "metrics"]),
        fast_reconnect(8),
        connector.clone(),
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    connector.inject(fixtures::envelope_frame("queue", json!({"depth": 4})));
    connector.inject(fixtures::envelope_frame("metrics", json!({"rps": 40})));
    wait_until(&controller, |s| s.extra("metrics").is_some()).await;

    assert_eq!(controller.read(|s| s.extra("queue").cloned()), None);
    assert_eq!(controller.stats().event_count, 1);
}

// ============================================================================
// Operator operations
// ============================================================================

#[tokio::test]
async fn test_pause_counts_and_resume_resyncs() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    controller.pause().unwrap();
    wait_until(&controller, PanelStore::is_paused).await;

    connector.inject(fixtures::envelope_frame("log", json!({"message": "missed"})));
    wait_until(&controller, |s| s.stats().event_count == 1).await;
    assert!(controller.read(|s| s.logs().is_empty()));
    assert_eq!(controller.stats().dropped_while_paused, 1);

    controller.resume().unwrap();
    let snapshot_request = Command::snapshot().to_json().unwrap();
    eventually(|| connector.sent_frames().contains(&snapshot_request)).await;
    assert!(!controller.is_paused());

    connector.inject(fixtures::envelope_frame(
        "snapshot",
        json!({"logs": [{"message": "missed"}]}),
    ));
    wait_until(&controller, |s| s.logs().len() == 1).await;
}

#[tokio::test]
async fn test_requested_snapshot_applies_while_paused() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    controller.pause().unwrap();
    wait_until(&controller, PanelStore::is_paused).await;

    controller.request_snapshot().unwrap();
    let snapshot_request = Command::snapshot().to_json().unwrap();
    eventually(|| connector.sent_frames().contains(&snapshot_request)).await;

    connector.inject(fixtures::envelope_frame(
        "snapshot",
        json!({"requests": [{"path": "/a"}, {"path": "/b"}]}),
    ));
    wait_until(&controller, |s| s.requests().len() == 2).await;

    assert!(controller.is_paused());
    assert_eq!(controller.stats().snapshots_applied, 1);
    assert_eq!(controller.stats().dropped_while_paused, 0);
}

#[tokio::test]
async fn test_clear_goes_over_http_when_available() {
    let server = TestServer::start(json!({})).await.unwrap();
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        Some(http_client(&server)),
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    connector.inject(fixtures::envelope_frame("log", json!({"message": "a"})));
    connector.inject(fixtures::request_frame("GET", "/", 200));
    wait_until(&controller, |s| s.logs().len() == 1 && s.requests().len() == 1).await;

    controller.clear(Some(vec!["logs".to_string()])).unwrap();
    wait_until(&controller, |s| s.logs().is_empty()).await;
    assert_eq!(controller.read(|s| s.requests().len()), 1);

    eventually(|| server.clears() == vec!["logs".to_string()]).await;
}

#[tokio::test]
async fn test_clear_falls_back_to_stream_command() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    controller.clear(None).unwrap();
    let clear_all = Command::clear(None).to_json().unwrap();
    eventually(|| connector.sent_frames().contains(&clear_all)).await;
}

// ============================================================================
// Connection notices
// ============================================================================

#[tokio::test]
async fn test_reconnect_notices() {
    let connector = MockConnector::new();
    let notifier = MemoryNotifier::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        notifier.clone(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    connector.close_link();
    eventually(|| {
        notifier
            .notices()
            .iter()
            .any(|(_, message)| message == "Reconnected to server")
    })
    .await;

    let levels = notifier.levels();
    assert_eq!(levels.first(), Some(&NoticeLevel::Success));
    assert!(levels.contains(&NoticeLevel::Warning));
    assert_eq!(controller.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn test_exhaustion_reports_error_once() {
    let connector = MockConnector::refusing();
    let notifier = MemoryNotifier::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(2),
        connector.clone(),
        None,
        notifier.clone(),
    );

    eventually(|| notifier.levels().contains(&NoticeLevel::Error)).await;
    assert_eq!(controller.status(), ConnectionStatus::Disconnected);
    assert_eq!(connector.connect_count(), 3);

    let warnings = notifier
        .levels()
        .into_iter()
        .filter(|l| *l == NoticeLevel::Warning)
        .count();
    assert_eq!(warnings, 1);

    // Manual connect starts a fresh cycle
    connector.push_outcome(MockOutcome::Accept);
    controller.connect().unwrap();
    wait_for_status(&controller, ConnectionStatus::Connected).await;
}

#[tokio::test]
async fn test_manual_close_is_quiet() {
    let connector = MockConnector::new();
    let notifier = MemoryNotifier::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        connector.clone(),
        None,
        notifier.clone(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    controller.close().unwrap();
    wait_for_status(&controller, ConnectionStatus::Disconnected).await;
    eventually(|| notifier.levels().contains(&NoticeLevel::Info)).await;

    assert!(!notifier.levels().contains(&NoticeLevel::Error));
    assert_eq!(connector.connect_count(), 1);
}

#[tokio::test]
async fn test_dropping_handles_stops_session() {
    let connector = MockConnector::new();
    let controller = ConsoleController::spawn(
        &ConsoleSection::default(),
        fast_reconnect(8),
        Arc::clone(&connector) as Arc<dyn devconsole_stream::Connector>,
        None,
        MemoryNotifier::new(),
    );
    wait_for_status(&controller, ConnectionStatus::Connected).await;

    let mut render = controller.render_watch();
    drop(controller);

    tokio::time::timeout(WAIT, async {
        while render.changed().await.is_ok() {}
    })
    .await
    .expect("session kept running");
}
