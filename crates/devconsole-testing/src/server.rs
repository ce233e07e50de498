//! In-process console server for integration tests
//!
//! Serves the same surface a real server exposes to the console:
//!
//! - `GET /api/snapshot` - the current snapshot JSON (or 500 when failing)
//! - `POST /api/clear` and `POST /api/clear/{panel}` - recorded
//! - `GET /ws` - pushes broadcast frames, records client commands, answers
//!   `{"type":"snapshot"}` with a snapshot envelope

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

struct ServerState {
    snapshot: Mutex<Value>,
    fail_snapshot: AtomicBool,
    clears: Mutex<Vec<String>>,
    commands: Mutex<Vec<String>>,
    pushes: broadcast::Sender<String>,
}

/// A running test server; shuts down on drop
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral localhost port and start serving `snapshot`
    pub async fn start(snapshot: Value) -> std::io::Result<Self> {
        let (pushes, _) = broadcast::channel(256);
        let state = Arc::new(ServerState {
            snapshot: Mutex::new(snapshot),
            fail_snapshot: AtomicBool::new(false),
            clears: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
            pushes,
        });

        let app = Router::new()
            .route("/api/snapshot", get(snapshot_handler))
            .route("/api/clear", post(clear_all_handler))
            .route("/api/clear/:panel", post(clear_panel_handler))
            .route("/ws", get(ws_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                debug!(error = %e, "Test server stopped");
            }
        });

        Ok(Self { addr, state, task })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_snapshot(&self, snapshot: Value) {
        *lock(&self.state.snapshot) = snapshot;
    }

    /// Make `GET /api/snapshot` answer 500
    pub fn fail_snapshot(&self, fail: bool) {
        self.state.fail_snapshot.store(fail, Ordering::SeqCst);
    }

    /// Clear requests received so far: `"*"` for all, else the panel name
    pub fn clears(&self) -> Vec<String> {
        lock(&self.state.clears).clone()
    }

    /// Command frames received from clients
    pub fn commands(&self) -> Vec<String> {
        lock(&self.state.commands).clone()
    }

    /// Number of connected WebSocket clients
    pub fn connected_clients(&self) -> usize {
        self.state.pushes.receiver_count()
    }

    /// Push a raw frame to every connected client
    pub fn push(&self, frame: impl Into<String>) -> usize {
        self.state.pushes.send(frame.into()).unwrap_or(0)
    }

    /// Push a `{type, payload}` envelope to every connected client
    pub fn push_envelope(&self, kind: &str, payload: Value) -> usize {
        self.push(json!({"type": kind, "payload": payload}).to_string())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn snapshot_handler(State(state): State<Arc<ServerState>>) -> Response {
    if state.fail_snapshot.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "snapshot unavailable").into_response();
    }
    let snapshot = lock(&state.snapshot).clone();
    Json(snapshot).into_response()
}

async fn clear_all_handler(State(state): State<Arc<ServerState>>) -> StatusCode {
    lock(&state.clears).push("*".to_string());
    StatusCode::NO_CONTENT
}

async fn clear_panel_handler(
    State(state): State<Arc<ServerState>>,
    Path(panel): Path<String>,
) -> StatusCode {
    lock(&state.clears).push(panel);
    StatusCode::NO_CONTENT
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut pushes = state.pushes.subscribe();

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let wants_snapshot = serde_json::from_str::<Value>(&text)
                        .ok()
                        .and_then(|v| v.get("type").and_then(Value::as_str).map(|t| t == "snapshot"))
                        .unwrap_or(false);
                    lock(&state.commands).push(text);

                    if wants_snapshot {
                        let payload = lock(&state.snapshot).clone();
                        let frame = json!({"type": "snapshot", "payload": payload}).to_string();
                        if socket.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            push = pushes.recv() => match push {
                Ok(frame) => {
                    if socket.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
