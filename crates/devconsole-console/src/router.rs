//! Event routing
//!
//! Maps each decoded envelope to the panel that owns it and applies it to
//! the store. Snapshots go to the store's replace routine; unknown types
//! are kept only when the panel list names them.

use crate::store::PanelStore;
use devconsole_core::{CustomEvent, Envelope, PanelKind};
use tracing::trace;

/// Where an envelope type belongs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Full-state replacement
    Snapshot,
    /// A built-in panel
    Panel(PanelKind),
    /// An unknown type kept under its own name
    Retained(String),
    /// An unknown type nobody asked for
    Dropped(String),
}

/// What happened to one dispatched envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A snapshot replaced every panel
    Snapshot,
    /// Stored in the named panel
    Stored(String),
    /// Counted but not stored because the store is paused
    Paused(String),
    /// Counted but refused by the store (a custom write with a bad path)
    Rejected(String),
    /// Not counted and not stored
    Dropped(String),
}

impl Dispatch {
    /// Whether the store changed in a way a renderer should notice.
    ///
    /// Paused events still bump the counters shown on the status line.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Dispatch::Dropped(_))
    }
}

/// Fixed type table for built-in panels
pub fn panel_for_type(kind: &str) -> Option<PanelKind> {
    match kind {
        "request" => Some(PanelKind::Requests),
        "sql" => Some(PanelKind::Sql),
        "log" => Some(PanelKind::Logs),
        "template" => Some(PanelKind::Template),
        "session" => Some(PanelKind::Session),
        "config" => Some(PanelKind::Config),
        "routes" => Some(PanelKind::Routes),
        "custom" => Some(PanelKind::Custom),
        _ => None,
    }
}

/// Classify an envelope against the store's retained panel names
pub fn classify(envelope: &Envelope, store: &PanelStore) -> Route {
    let kind = envelope.kind();
    if kind == "snapshot" {
        return Route::Snapshot;
    }
    if let Some(panel) = panel_for_type(kind) {
        return Route::Panel(panel);
    }
    if store.is_retained(kind) {
        Route::Retained(kind.to_string())
    } else {
        Route::Dropped(kind.to_string())
    }
}

/// Apply one envelope to the store.
///
/// Every classified envelope other than a snapshot is counted, paused or
/// not. Runs to completion without yielding, so each envelope is applied
/// atomically with respect to readers holding the store lock.
pub fn dispatch(envelope: Envelope, store: &mut PanelStore) -> Dispatch {
    let route = classify(&envelope, store);
    let name = match route {
        Route::Snapshot => {
            let Envelope::Snapshot(snapshot) = envelope else {
                return Dispatch::Dropped("snapshot".to_string());
            };
            store.apply_snapshot(*snapshot);
            return Dispatch::Snapshot;
        }
        Route::Dropped(name) => {
            trace!(kind = %name, "Dropping unconfigured event type");
            return Dispatch::Dropped(name);
        }
        Route::Panel(panel) => panel.as_str().to_string(),
        Route::Retained(name) => name,
    };

    store.record_event();

    let stored = match envelope {
        Envelope::Request(entry) => store.push_request(entry),
        Envelope::Sql(entry) => store.push_sql(entry),
        Envelope::Log(entry) => store.push_log(entry),
        Envelope::Template(value) => store.replace_template(value),
        Envelope::Session(value) => store.replace_session(value),
        Envelope::Config(value) => store.replace_config(value),
        Envelope::Routes(routes) => store.replace_routes(routes),
        Envelope::Custom(CustomEvent::Log(entry)) => store.push_custom_log(entry),
        Envelope::Custom(CustomEvent::Set { path, value }) => store.set_custom(&path, value),
        Envelope::Other { name, payload } => store.replace_extra(&name, payload),
        Envelope::Snapshot(_) => false,
    };

    if stored {
        Dispatch::Stored(name)
    } else if store.is_paused() {
        Dispatch::Paused(name)
    } else {
        Dispatch::Rejected(name)
    }
}
