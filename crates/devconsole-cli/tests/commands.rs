//! Commands against the in-process test server

use devconsole_cli::commands::{clear, snapshot};
use devconsole_cli::{ClientContext, Formatter, OutputFormat};
use devconsole_testing::{fixtures, TestServer};
use serde_json::{json, Value};
use tempfile::TempDir;

fn context_for(server: &TestServer, dir: &TempDir) -> ClientContext {
    let path = dir.path().join("devconsole.toml");
    std::fs::write(&path, "[console]\npanels = [\"requests\", \"session\", \"metrics\"]\n").unwrap();
    ClientContext::load(Some(&path), Some(server.base_url())).unwrap()
}

fn json_output() -> Formatter {
    Formatter::new(OutputFormat::Json, 100)
}

#[tokio::test]
async fn test_snapshot_prints_whole_snapshot() {
    let server = TestServer::start(json!(fixtures::sample_snapshot(3))).await.unwrap();
    let dir = TempDir::new().unwrap();
    let ctx = context_for(&server, &dir);

    let mut out = Vec::new();
    snapshot::run(&ctx, snapshot::SnapshotArgs::default(), &json_output(), &mut out)
        .await
        .unwrap();

    let printed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(printed["requests"].as_array().unwrap().len(), 3);
    assert_eq!(printed["session"], json!({"user_id": 7}));
}

#[tokio::test]
async fn test_snapshot_single_panel_with_search() {
    let mut body = json!(fixtures::sample_snapshot(1));
    body["metrics"] = json!({"rps": 12, "p99_ms": 40});
    body["ignored"] = json!({"x": 1});
    let server = TestServer::start(body).await.unwrap();
    let dir = TempDir::new().unwrap();
    let ctx = context_for(&server, &dir);

    let mut out = Vec::new();
    let args = snapshot::SnapshotArgs {
        panel: Some("metrics".into()),
        search: Some("rps".into()),
    };
    snapshot::run(&ctx, args, &json_output(), &mut out).await.unwrap();
    let printed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(printed, json!({"rps": 12}));

    // Unconfigured extras never reach the store
    let mut out = Vec::new();
    let args = snapshot::SnapshotArgs {
        panel: Some("ignored".into()),
        search: None,
    };
    assert!(snapshot::run(&ctx, args, &json_output(), &mut out).await.is_err());
}

#[tokio::test]
async fn test_snapshot_failure_is_reported() {
    let server = TestServer::start(json!({})).await.unwrap();
    server.fail_snapshot(true);
    let dir = TempDir::new().unwrap();
    let ctx = context_for(&server, &dir);

    let mut out = Vec::new();
    let err = snapshot::run(&ctx, snapshot::SnapshotArgs::default(), &json_output(), &mut out)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to fetch snapshot"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_clear_panel_and_all() {
    let server = TestServer::start(json!({})).await.unwrap();
    let dir = TempDir::new().unwrap();
    let ctx = context_for(&server, &dir);

    let mut out = Vec::new();
    clear::run(
        &ctx,
        clear::ClearArgs {
            panel: Some("sql".into()),
        },
        &mut out,
    )
    .await
    .unwrap();
    clear::run(&ctx, clear::ClearArgs::default(), &mut out).await.unwrap();

    assert_eq!(server.clears(), vec!["sql".to_string(), "*".to_string()]);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Cleared panel 'sql'\nCleared all panels\n"
    );
}
