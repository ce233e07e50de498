//! Panel row types
//!
//! The server's payload schema is open ended, so these are lenient views:
//! every field defaults when missing or `null`, numbers are accepted as
//! floats or strings, and anything unrecognized is kept in `extra` so it
//! survives a snapshot round-trip unchanged.

use crate::lenient::{null_as_default, number_u16, number_u64};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One HTTP request observed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "number_u16")]
    pub status: u16,
    #[serde(deserialize_with = "number_u64")]
    pub duration_ns: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestEntry {
    pub fn new(method: impl Into<String>, path: impl Into<String>, status: u16) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            status,
            ..Self::default()
        }
    }
}

/// One SQL statement with its timing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub query: String,
    #[serde(deserialize_with = "number_u64")]
    pub duration_ns: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SqlEntry {
    pub fn new(query: impl Into<String>, duration_ns: u64) -> Self {
        Self {
            query: query.into(),
            duration_ns,
            ..Self::default()
        }
    }

    /// Duration in whole milliseconds (truncating)
    pub fn duration_ms(&self) -> u64 {
        self.duration_ns / 1_000_000
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// One application log line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub level: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub fields: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            message: message.into(),
            ..Self::default()
        }
    }
}

/// One entry of the server's route table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub handler: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Free-form log line pushed by application code into the custom panel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomLogEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a `custom` envelope.
///
/// `{"path":"a.b.c","value":..}` writes into the custom tree; anything else
/// is appended to the custom log.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomEvent {
    Log(CustomLogEntry),
    Set { path: String, value: Value },
}

impl CustomEvent {
    /// Classify a raw `custom` payload
    pub fn from_payload(payload: Value) -> crate::Result<Self> {
        if let Value::Object(ref map) = payload {
            let is_set = map.get("action").and_then(Value::as_str) == Some("set")
                || (map.contains_key("path") && map.contains_key("value"));
            if is_set {
                let path = map
                    .get("path")
                    .and_then(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        crate::Error::MalformedEnvelope("custom set without a path".into())
                    })?
                    .to_string();
                let value = map.get("value").cloned().unwrap_or(Value::Null);
                return Ok(Self::Set { path, value });
            }
        }

        let entry = match payload {
            Value::Object(_) => serde_json::from_value(payload)?,
            other => CustomLogEntry {
                value: other,
                ..CustomLogEntry::default()
            },
        };
        Ok(Self::Log(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_keeps_unknown_fields() {
        let entry: RequestEntry = serde_json::from_value(json!({
            "method": "GET",
            "path": "/users",
            "status": 200,
            "duration_ns": 1500,
            "remote_addr": "10.0.0.1"
        }))
        .unwrap();
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.extra["remote_addr"], json!("10.0.0.1"));

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["remote_addr"], json!("10.0.0.1"));
    }

    #[test]
    fn test_missing_fields_default() {
        let entry: SqlEntry = serde_json::from_value(json!({"query": "SELECT 1"})).unwrap();
        assert_eq!(entry.duration_ns, 0);
        assert!(!entry.has_error());
    }

    #[test]
    fn test_null_fields_default() {
        let entry: RequestEntry = serde_json::from_value(json!({
            "method": null,
            "path": "/health",
            "status": null,
            "duration_ns": null
        }))
        .unwrap();
        assert_eq!(entry, RequestEntry::new("", "/health", 0));

        let entry: LogEntry =
            serde_json::from_value(json!({"message": "up", "source": null, "fields": null}))
                .unwrap();
        assert_eq!(entry.message, "up");
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_numbers_as_floats_and_strings() {
        let entry: SqlEntry =
            serde_json::from_value(json!({"query": "SELECT 1", "duration_ns": 1500000.0}))
                .unwrap();
        assert_eq!(entry.duration_ns, 1_500_000);
        assert_eq!(entry.duration_ms(), 1);

        let entry: RequestEntry =
            serde_json::from_value(json!({"status": "404", "duration_ns": 2.5e6})).unwrap();
        assert_eq!(entry.status, 404);
        assert_eq!(entry.duration_ns, 2_500_000);

        let entry: RequestEntry = serde_json::from_value(json!({"status": 70000})).unwrap();
        assert_eq!(entry.status, 0);
    }

    #[test]
    fn test_sql_error_empty_string_is_not_an_error() {
        let mut entry = SqlEntry::new("SELECT 1", 0);
        entry.error = Some(String::new());
        assert!(!entry.has_error());
        entry.error = Some("syntax error".into());
        assert!(entry.has_error());
    }

    #[test]
    fn test_custom_set_by_action() {
        let event =
            CustomEvent::from_payload(json!({"action": "set", "path": "a.b", "value": 1})).unwrap();
        assert_eq!(
            event,
            CustomEvent::Set {
                path: "a.b".into(),
                value: json!(1)
            }
        );
    }

    #[test]
    fn test_custom_set_by_shape() {
        let event = CustomEvent::from_payload(json!({"path": "x", "value": null})).unwrap();
        assert!(matches!(event, CustomEvent::Set { ref path, .. } if path == "x"));
    }

    #[test]
    fn test_custom_set_without_path_is_malformed() {
        assert!(CustomEvent::from_payload(json!({"action": "set", "value": 1})).is_err());
    }

    #[test]
    fn test_custom_log_from_object_and_scalar() {
        let event = CustomEvent::from_payload(json!({"label": "cache", "value": 3})).unwrap();
        match event {
            CustomEvent::Log(entry) => {
                assert_eq!(entry.label, "cache");
                assert_eq!(entry.value, json!(3));
            }
            other => panic!("expected log, got {:?}", other),
        }

        let event = CustomEvent::from_payload(json!("hello")).unwrap();
        assert!(matches!(event, CustomEvent::Log(ref e) if e.value == json!("hello")));
    }
}
