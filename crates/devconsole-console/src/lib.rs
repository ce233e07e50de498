//! Devconsole Console - panel state and its synchronization
//!
//! # Architecture
//!
//! - `store` - Bounded per-panel buckets, singleton panels, the custom tree
//! - `router` - Envelope type to panel mapping and dispatch into the store
//! - `reconciler` - HTTP snapshot hydration and best-effort clear calls
//! - `filter` - Render-time filters for every panel
//! - `notifier` - Injected sink for operator notices
//! - `controller` - The session task that owns store writes
//!
//! # Data flow
//!
//! ```text
//! StreamTransport --events--> session task --dispatch--> PanelStore
//!                                  |                         |
//!                          render generation ++        read lock
//!                                  v                         v
//!                              renderer ---- filter ----> rows
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod controller;
pub mod filter;
pub mod notifier;
pub mod reconciler;
pub mod router;
pub mod store;

pub use controller::ConsoleController;
pub use filter::{is_slow_query, JsonFilter, LogFilter, RequestFilter, RouteFilter, SqlFilter};
pub use notifier::{MemoryNotifier, NoticeLevel, Notifier, NotifierRef, TracingNotifier};
pub use reconciler::SnapshotClient;
pub use router::{dispatch, Dispatch, Route};
pub use store::{PanelStore, StoreStats};
