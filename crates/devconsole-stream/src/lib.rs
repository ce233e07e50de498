//! Devconsole Stream - reconnecting duplex event stream
//!
//! # Architecture
//!
//! - `transport` - Actor owning the link, pending command queue and reconnect timer
//! - `connector` - Seam for opening links, plus the WebSocket implementation
//! - `backoff` - Pure exponential backoff and jitter functions
//! - `endpoint` - Server URLs derived from the configured base URL
//!
//! # Usage
//!
//! ```rust,ignore
//! use devconsole_stream::{Endpoints, StreamTransport, WsConnector};
//!
//! let endpoints = Endpoints::new("http://127.0.0.1:8080")?;
//! let connector = WsConnector::new(endpoints.stream_url()?, Duration::from_secs(5));
//! let (transport, mut events) = StreamTransport::spawn(Arc::new(connector), config.stream);
//! transport.subscribe(["request", "sql"])?;
//! transport.connect()?;
//! while let Some(event) = events.recv().await { /* ... */ }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod backoff;
pub mod connector;
pub mod endpoint;
pub mod transport;

pub use backoff::{backoff_delay, jitter, reconnect_delay};
pub use connector::{Connector, FrameSink, FrameStream, WsConnector};
pub use endpoint::Endpoints;
pub use transport::{StreamTransport, TransportEvent};
