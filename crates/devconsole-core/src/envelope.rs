//! Wire envelopes
//!
//! Inbound frames are `{"type": .., "payload": ..}` and decode into the
//! [`Envelope`] tagged union. Outbound frames are [`Command`]s.

use crate::entries::{CustomEvent, LogEntry, RequestEntry, RouteEntry, SqlEntry};
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// A decoded inbound event.
///
/// One variant per known event type; anything else lands in `Other` with the
/// payload untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Snapshot(Box<Snapshot>),
    Request(RequestEntry),
    Sql(SqlEntry),
    Log(LogEntry),
    Template(Value),
    Session(Value),
    Config(Value),
    Routes(Vec<RouteEntry>),
    Custom(CustomEvent),
    Other { name: String, payload: Value },
}

impl Envelope {
    /// Decode one text frame.
    ///
    /// Fails on invalid JSON, a missing `type`, or a payload that does not fit
    /// its declared type. Callers drop failed frames.
    pub fn decode(text: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(text)
            .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
        Self::from_parts(raw.kind, raw.payload)
    }

    /// Build an envelope from an already-split type and payload
    pub fn from_parts(kind: String, payload: Value) -> Result<Self> {
        let malformed = |e: serde_json::Error| Error::MalformedEnvelope(format!("{}: {}", kind, e));

        let envelope = match kind.as_str() {
            "snapshot" => Self::Snapshot(Box::new(
                serde_json::from_value(payload).map_err(malformed)?,
            )),
            "request" => Self::Request(serde_json::from_value(payload).map_err(malformed)?),
            "sql" => Self::Sql(serde_json::from_value(payload).map_err(malformed)?),
            "log" => Self::Log(serde_json::from_value(payload).map_err(malformed)?),
            "template" => Self::Template(payload),
            "session" => Self::Session(payload),
            "config" => Self::Config(payload),
            "routes" => Self::Routes(
                serde_json::from_value::<Option<Vec<RouteEntry>>>(payload)
                    .map_err(malformed)?
                    .unwrap_or_default(),
            ),
            "custom" => Self::Custom(CustomEvent::from_payload(payload)?),
            "" => return Err(Error::MalformedEnvelope("empty envelope type".into())),
            _ => Self::Other {
                name: kind.clone(),
                payload,
            },
        };
        Ok(envelope)
    }

    /// The declared `type` of this envelope
    pub fn kind(&self) -> &str {
        match self {
            Self::Snapshot(_) => "snapshot",
            Self::Request(_) => "request",
            Self::Sql(_) => "sql",
            Self::Log(_) => "log",
            Self::Template(_) => "template",
            Self::Session(_) => "session",
            Self::Config(_) => "config",
            Self::Routes(_) => "routes",
            Self::Custom(_) => "custom",
            Self::Other { name, .. } => name,
        }
    }
}

/// Operator command type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Subscribe,
    Unsubscribe,
    Snapshot,
    Clear,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Snapshot => "snapshot",
            Self::Clear => "clear",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound operator command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panels: Option<Vec<String>>,
}

impl Command {
    pub fn new(kind: CommandKind, panels: Option<Vec<String>>) -> Self {
        Self { kind, panels }
    }

    pub fn subscribe<S: Into<String>>(panels: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            CommandKind::Subscribe,
            Some(panels.into_iter().map(Into::into).collect()),
        )
    }

    pub fn unsubscribe<S: Into<String>>(panels: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            CommandKind::Unsubscribe,
            Some(panels.into_iter().map(Into::into).collect()),
        )
    }

    pub fn snapshot() -> Self {
        Self::new(CommandKind::Snapshot, None)
    }

    /// `None` clears every panel
    pub fn clear(panels: Option<Vec<String>>) -> Self {
        Self::new(CommandKind::Clear, panels)
    }

    /// Serialize to the wire format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
