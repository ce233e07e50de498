//! Configuration types and loading for devconsole
//!
//! This crate provides:
//! - Configuration structures for the console, the stream and logging
//! - Config file loading (TOML format) with validation
//! - Environment variable overrides
//! - Config path discovery
//!
//! # Module Organization
//!
//! - `console` - Base URL, panel list, capacities, slow-query threshold
//! - `stream` - Reconnection backoff settings
//! - `logging` - Log level and output settings
//! - `types` - The root [`ConsoleConfig`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use devconsole_config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("devconsole.toml"))?;
//! println!("Streaming from {}", config.console.base_url);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod loader;

// Default constants for all configuration values
pub mod constants;

// Path utilities
pub mod paths;

mod console;
mod logging;
mod stream;
mod types;

pub use console::{Capacities, ConsoleSection};
pub use loader::{
    load_config, load_config_from_str, load_config_or_default, validate_config, ConfigError,
};
pub use logging::LoggingSection;
pub use stream::ReconnectConfig;
pub use types::ConsoleConfig;
