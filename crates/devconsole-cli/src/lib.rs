//! Devconsole CLI - command-line live debug console
//!
//! The `devconsole` binary is a thin wrapper: argument parsing and logging
//! setup live in `main.rs`, everything else is here so it can be tested.
//!
//! - `context` - Config discovery and loading shared by every command
//! - `commands` - `tail`, `snapshot`, `clear` and `config`
//! - `output` - Text and JSON row formatting

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod commands;
pub mod context;
pub mod output;

pub use context::{ClientContext, ClientContextError};
pub use output::{Formatter, OutputFormat};
