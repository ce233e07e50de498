//! CLI command implementations

pub mod clear;
pub mod config;
pub mod snapshot;
pub mod tail;
