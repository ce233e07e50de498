//! Test utilities for devconsole
//!
//! # Mocks
//!
//! - [`MockConnector`] - Scripted connector: connection outcomes, captured
//!   outbound frames, injected inbound frames
//!
//! # Servers
//!
//! - [`TestServer`] - In-process HTTP + WebSocket console server (axum)
//!
//! # Fixtures
//!
//! - [`fixtures::sample_request_mix`] - The 5 GET/200, 3 POST/500, 2 GET/404 set
//! - [`fixtures::sample_snapshot`] - A snapshot with every category populated

pub mod fixtures;
pub mod mock_connector;
pub mod proptest_config;
pub mod server;

pub use mock_connector::{MockConnector, MockOutcome};
pub use server::TestServer;
