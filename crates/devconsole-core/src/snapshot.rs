//! Full panel snapshot
//!
//! Same shape whether it comes from `GET /api/snapshot` or a `snapshot`
//! envelope. Missing categories mean "empty", never "unchanged".

use crate::entries::{CustomLogEntry, LogEntry, RequestEntry, RouteEntry, SqlEntry};
use crate::lenient::null_as_default;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub requests: Vec<RequestEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub sql: Vec<SqlEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub logs: Vec<LogEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub routes: Vec<RouteEntry>,
    pub template: Value,
    pub session: Value,
    pub config: Value,
    /// Nested custom key/value tree
    pub custom: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_logs: Vec<CustomLogEntry>,
    /// Categories outside the built-in set, keyed by envelope type
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Parse a snapshot body
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether every category is empty
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
            && self.sql.is_empty()
            && self.logs.is_empty()
            && self.routes.is_empty()
            && self.custom_logs.is_empty()
            && is_blank(&self.template)
            && is_blank(&self.session)
            && is_blank(&self.config)
            && is_blank(&self.custom)
            && self.extra.is_empty()
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
