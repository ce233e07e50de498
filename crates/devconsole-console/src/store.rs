//! Panel state store
//!
//! The aggregate every panel renders from. List panels live in ring buffers
//! sized from configuration; singleton panels are replaced wholesale; the
//! custom tree takes dotted-path writes. The store is a plain value: the
//! controller task owns the only mutable reference.

use chrono::{DateTime, Utc};
use devconsole_config::{Capacities, ConsoleSection};
use devconsole_core::{
    CustomLogEntry, LogEntry, PanelKind, RequestEntry, RingBuffer, RouteEntry, Snapshot, SqlEntry,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Counters shown on the console status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Classified events, counted even while paused
    pub event_count: u64,
    pub last_event_at: Option<DateTime<Utc>>,
    /// Events acknowledged but not stored because the store was paused
    pub dropped_while_paused: u64,
    pub snapshots_applied: u64,
}

/// Current contents of every panel
#[derive(Debug, Clone)]
pub struct PanelStore {
    requests: RingBuffer<RequestEntry>,
    sql: RingBuffer<SqlEntry>,
    logs: RingBuffer<LogEntry>,
    custom_logs: RingBuffer<CustomLogEntry>,
    routes: Vec<RouteEntry>,
    template: Value,
    session: Value,
    config: Value,
    custom: Value,
    /// Latest payload of each retained non-builtin envelope type
    extra: BTreeMap<String, Value>,
    /// Configured panel names that are not built-ins
    retained: BTreeSet<String>,
    paused: bool,
    stats: StoreStats,
}

// Two stores are equal when every bucket holds the same data
impl PartialEq for PanelStore {
    fn eq(&self, other: &Self) -> bool {
        self.requests == other.requests
            && self.sql == other.sql
            && self.logs == other.logs
            && self.custom_logs == other.custom_logs
            && self.routes == other.routes
            && self.template == other.template
            && self.session == other.session
            && self.config == other.config
            && self.custom == other.custom
            && self.extra == other.extra
    }
}

impl Default for PanelStore {
    fn default() -> Self {
        Self::new(&Capacities::default(), std::iter::empty::<String>())
    }
}

impl PanelStore {
    /// Empty store.
    ///
    /// `panels` is the configured panel list; names that are not built-in
    /// panels become retained keys for unknown envelope types.
    pub fn new<S: AsRef<str>>(capacities: &Capacities, panels: impl IntoIterator<Item = S>) -> Self {
        let retained = panels
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| p.parse::<PanelKind>().is_err())
            .collect();

        Self {
            requests: RingBuffer::new(capacities.requests),
            sql: RingBuffer::new(capacities.sql),
            logs: RingBuffer::new(capacities.logs),
            custom_logs: RingBuffer::new(capacities.custom_logs),
            routes: Vec::new(),
            template: Value::Null,
            session: Value::Null,
            config: Value::Null,
            custom: Value::Object(Map::new()),
            extra: BTreeMap::new(),
            retained,
            paused: false,
            stats: StoreStats::default(),
        }
    }

    pub fn from_section(section: &ConsoleSection) -> Self {
        Self::new(&section.capacities, &section.panels)
    }

    // ========================================================================
    // Pause and counters
    // ========================================================================

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pausing stops mutation; events keep being counted
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Count one classified event
    pub fn record_event(&mut self) {
        self.stats.event_count += 1;
        self.stats.last_event_at = Some(Utc::now());
    }

    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Whether an unknown envelope type named `name` is kept
    pub fn is_retained(&self, name: &str) -> bool {
        self.retained.contains(name)
    }

    pub fn retained_panels(&self) -> impl Iterator<Item = &str> {
        self.retained.iter().map(String::as_str)
    }

    /// Returns false (and counts the drop) when paused
    fn accept(&mut self) -> bool {
        if self.paused {
            self.stats.dropped_while_paused += 1;
            return false;
        }
        true
    }

    // ========================================================================
    // List panels
    // ========================================================================

    pub fn push_request(&mut self, entry: RequestEntry) -> bool {
        if !self.accept() {
            return false;
        }
        self.requests.push(entry);
        true
    }

    pub fn push_sql(&mut self, entry: SqlEntry) -> bool {
        if !self.accept() {
            return false;
        }
        self.sql.push(entry);
        true
    }

    pub fn push_log(&mut self, entry: LogEntry) -> bool {
        if !self.accept() {
            return false;
        }
        self.logs.push(entry);
        true
    }

    pub fn push_custom_log(&mut self, entry: CustomLogEntry) -> bool {
        if !self.accept() {
            return false;
        }
        self.custom_logs.push(entry);
        true
    }

    // ========================================================================
    // Singleton panels
    // ========================================================================

    pub fn replace_template(&mut self, value: Value) -> bool {
        self.replace(PanelKind::Template, value)
    }

    pub fn replace_session(&mut self, value: Value) -> bool {
        self.replace(PanelKind::Session, value)
    }

    pub fn replace_config(&mut self, value: Value) -> bool {
        self.replace(PanelKind::Config, value)
    }

    pub fn replace_routes(&mut self, routes: Vec<RouteEntry>) -> bool {
        if !self.accept() {
            return false;
        }
        self.routes = routes;
        true
    }

    fn replace(&mut self, kind: PanelKind, value: Value) -> bool {
        if !self.accept() {
            return false;
        }
        match kind {
            PanelKind::Template => self.template = value,
            PanelKind::Session => self.session = value,
            PanelKind::Config => self.config = value,
            PanelKind::Custom => self.custom = value,
            other => debug!(panel = %other, "Not a singleton panel"),
        }
        true
    }

    /// Keep the latest payload of a retained unknown type
    pub fn replace_extra(&mut self, name: &str, payload: Value) -> bool {
        if !self.is_retained(name) || !self.accept() {
            return false;
        }
        self.extra.insert(name.to_string(), payload);
        true
    }

    /// Write `value` at a dotted path in the custom tree.
    ///
    /// Intermediate segments become objects (replacing any scalar in the
    /// way); sibling keys are untouched. Paths with an empty segment are
    /// rejected.
    pub fn set_custom(&mut self, path: &str, value: Value) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            debug!(path, "Ignoring custom write with an empty path segment");
            return false;
        }
        if !self.accept() {
            return false;
        }
        set_path(&mut self.custom, &segments, value);
        true
    }

    // ========================================================================
    // Snapshot and clear
    // ========================================================================

    /// Replace every bucket with the snapshot's contents.
    ///
    /// List categories keep only the newest entries that fit their
    /// capacity. Unknown categories are kept only when retained. Applies
    /// while paused too: a snapshot is a requested resync, not a live event.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot {
            requests,
            sql,
            logs,
            routes,
            template,
            session,
            config,
            custom,
            custom_logs,
            extra,
        } = snapshot;

        self.requests.replace(requests);
        self.sql.replace(sql);
        self.logs.replace(logs);
        self.custom_logs.replace(custom_logs);
        self.routes = routes;
        self.template = template;
        self.session = session;
        self.config = config;
        self.custom = match custom {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        self.extra = extra
            .into_iter()
            .filter(|(name, _)| self.retained.contains(name))
            .collect();

        self.stats.snapshots_applied += 1;
    }

    /// Empty the named panels, or every panel when `panels` is `None`.
    ///
    /// Clearing is an operator action and works while paused.
    pub fn clear(&mut self, panels: Option<&[String]>) {
        let Some(panels) = panels else {
            self.requests.clear();
            self.sql.clear();
            self.logs.clear();
            self.custom_logs.clear();
            self.routes.clear();
            self.template = Value::Null;
            self.session = Value::Null;
            self.config = Value::Null;
            self.custom = Value::Object(Map::new());
            self.extra.clear();
            return;
        };

        for name in panels {
            match name.parse::<PanelKind>() {
                Ok(PanelKind::Requests) => self.requests.clear(),
                Ok(PanelKind::Sql) => self.sql.clear(),
                Ok(PanelKind::Logs) => self.logs.clear(),
                Ok(PanelKind::Routes) => self.routes.clear(),
                Ok(PanelKind::Template) => self.template = Value::Null,
                Ok(PanelKind::Session) => self.session = Value::Null,
                Ok(PanelKind::Config) => self.config = Value::Null,
                Ok(PanelKind::Custom) => {
                    self.custom = Value::Object(Map::new());
                    self.custom_logs.clear();
                }
                Err(_) => {
                    self.extra.remove(name);
                }
            }
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn requests(&self) -> &RingBuffer<RequestEntry> {
        &self.requests
    }

    pub fn sql(&self) -> &RingBuffer<SqlEntry> {
        &self.sql
    }

    pub fn logs(&self) -> &RingBuffer<LogEntry> {
        &self.logs
    }

    pub fn custom_logs(&self) -> &RingBuffer<CustomLogEntry> {
        &self.custom_logs
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn template(&self) -> &Value {
        &self.template
    }

    pub fn session(&self) -> &Value {
        &self.session
    }

    pub fn config(&self) -> &Value {
        &self.config
    }

    pub fn custom(&self) -> &Value {
        &self.custom
    }

    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// JSON view of a panel by name (lists are serialized as arrays)
    pub fn panel_json(&self, name: &str) -> Option<Value> {
        let value = match name.parse::<PanelKind>() {
            Ok(PanelKind::Requests) => serde_json::to_value(&self.requests).ok()?,
            Ok(PanelKind::Sql) => serde_json::to_value(&self.sql).ok()?,
            Ok(PanelKind::Logs) => serde_json::to_value(&self.logs).ok()?,
            Ok(PanelKind::Routes) => serde_json::to_value(&self.routes).ok()?,
            Ok(PanelKind::Template) => self.template.clone(),
            Ok(PanelKind::Session) => self.session.clone(),
            Ok(PanelKind::Config) => self.config.clone(),
            Ok(PanelKind::Custom) => self.custom.clone(),
            Err(_) => self.extra.get(name)?.clone(),
        };
        Some(value)
    }

    /// Number of rows in a list panel (0 for singletons)
    pub fn len_of(&self, kind: PanelKind) -> usize {
        match kind {
            PanelKind::Requests => self.requests.len(),
            PanelKind::Sql => self.sql.len(),
            PanelKind::Logs => self.logs.len(),
            PanelKind::Routes => self.routes.len(),
            PanelKind::Custom => self.custom_logs.len(),
            _ => 0,
        }
    }

    /// Serialize every bucket
    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            requests: self.requests.to_vec(),
            sql: self.sql.to_vec(),
            logs: self.logs.to_vec(),
            routes: self.routes.clone(),
            template: self.template.clone(),
            session: self.session.clone(),
            config: self.config.clone(),
            custom: self.custom.clone(),
            custom_logs: self.custom_logs.to_vec(),
            extra: self.extra.clone(),
        }
    }
}

fn set_path(root: &mut Value, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Some(map) = node.as_object_mut() else {
            return;
        };
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Some(map) = node.as_object_mut() {
        map.insert(last.to_string(), value);
    }
}
