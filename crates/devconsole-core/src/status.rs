//! Connection lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the console's duplex stream.
///
/// The stream transport is the only writer. `Error` is transient: it is
/// reported on the event stream when a transport-level failure happens, next
/// to the lifecycle state, and is never the value the transport's status
/// watch settles on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Initial and terminal state
    #[default]
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// Connection open, commands flow immediately
    Connected,
    /// Connection lost, a reconnect is scheduled
    Reconnecting,
    /// Transport-level failure (transient)
    Error,
}

impl ConnectionStatus {
    /// Get the status as a string (for serialization/display)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        }
    }

    /// Whether an attempt is open or in flight
    pub fn is_open_or_opening(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
