//! Test fixtures and sample data factories

use devconsole_core::{LogEntry, RequestEntry, RouteEntry, Snapshot, SqlEntry};
use serde_json::{json, Value};

/// A request with the given method and status
pub fn sample_request(method: &str, path: &str, status: u16) -> RequestEntry {
    RequestEntry {
        duration_ns: 1_250_000,
        ..RequestEntry::new(method, path, status)
    }
}

/// Ten requests: 5 GET/200, 3 POST/500, 2 GET/404
pub fn sample_request_mix() -> Vec<RequestEntry> {
    let mut requests = Vec::with_capacity(10);
    for i in 0..5 {
        requests.push(sample_request("GET", &format!("/users/{}", i), 200));
    }
    for i in 0..3 {
        requests.push(sample_request("POST", &format!("/orders/{}", i), 500));
    }
    for i in 0..2 {
        requests.push(sample_request("GET", &format!("/missing/{}", i), 404));
    }
    requests
}

/// A SQL statement that took `duration_ms` milliseconds
pub fn sample_sql(query: &str, duration_ms: u64) -> SqlEntry {
    SqlEntry::new(query, duration_ms * 1_000_000)
}

/// A log line numbered `n`
pub fn sample_log(level: &str, n: usize) -> LogEntry {
    LogEntry {
        source: "app::worker".to_string(),
        ..LogEntry::new(level, format!("message {}", n))
    }
}

pub fn sample_route(method: &str, path: &str, handler: &str) -> RouteEntry {
    RouteEntry {
        method: method.to_string(),
        path: path.to_string(),
        handler: handler.to_string(),
        ..RouteEntry::default()
    }
}

/// Snapshot with `requests` GET requests and one of everything else
pub fn sample_snapshot(requests: usize) -> Snapshot {
    Snapshot {
        requests: (0..requests)
            .map(|i| sample_request("GET", &format!("/snap/{}", i), 200))
            .collect(),
        sql: vec![sample_sql("SELECT * FROM users", 3)],
        logs: vec![sample_log("info", 0)],
        routes: vec![sample_route("GET", "/users", "users::index")],
        template: json!({"name": "index.html"}),
        session: json!({"user_id": 7}),
        config: json!({"debug": true}),
        custom: json!({"cache": {"hits": 10}}),
        ..Snapshot::default()
    }
}

/// Wire frame for an envelope
pub fn envelope_frame(kind: &str, payload: Value) -> String {
    json!({"type": kind, "payload": payload}).to_string()
}

/// Wire frame for a request envelope
pub fn request_frame(method: &str, path: &str, status: u16) -> String {
    envelope_frame(
        "request",
        json!({"method": method, "path": path, "status": status, "duration_ns": 1_000_000}),
    )
}
