//! Devconsole Core - Domain types for the live debug console
//!
//! This crate holds the types every other devconsole crate speaks in.
//! It has no I/O and no runtime dependencies.
//!
//! # Architecture
//!
//! - `status` - Connection lifecycle status reported by the stream transport
//! - `envelope` - Inbound event envelopes (tagged union) and outbound commands
//! - `entries` - Lenient typed views of the panel rows (requests, SQL, logs, routes)
//! - `panel` - Panel names and the built-in panel list
//! - `ring_buffer` - Fixed-capacity FIFO used by every growable panel
//! - `snapshot` - Full serialized copy of every panel bucket
//! - `error` - Domain error types

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod entries;
pub mod envelope;
pub mod error;
mod lenient;
pub mod panel;
pub mod ring_buffer;
pub mod snapshot;
pub mod status;

pub use entries::{CustomEvent, CustomLogEntry, LogEntry, RequestEntry, RouteEntry, SqlEntry};
pub use envelope::{Command, CommandKind, Envelope};
pub use error::{Error, Result};
pub use panel::{PanelKind, BUILTIN_PANELS};
pub use ring_buffer::RingBuffer;
pub use snapshot::Snapshot;
pub use status::ConnectionStatus;
