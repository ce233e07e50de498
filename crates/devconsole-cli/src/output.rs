//! Output formatting for CLI commands
//!
//! - Text format (default, one aligned line per row)
//! - JSON format (one compact JSON document per row, for piping into `jq`)

use devconsole_console::{is_slow_query, StoreStats};
use devconsole_core::{
    ConnectionStatus, CustomLogEntry, LogEntry, RequestEntry, RouteEntry, SqlEntry,
};
use serde::Serialize;
use serde_json::Value;

/// Output format for CLI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

/// Turns panel rows into printable lines
#[derive(Clone, Debug)]
pub struct Formatter {
    pub format: OutputFormat,
    pub slow_query_ms: u64,
}

impl Formatter {
    pub fn new(format: OutputFormat, slow_query_ms: u64) -> Self {
        Self {
            format,
            slow_query_ms,
        }
    }

    pub fn request(&self, entry: &RequestEntry) -> String {
        match self.format {
            OutputFormat::Text => format!(
                "{:<7} {:>3} {:>10}  {}",
                entry.method,
                entry.status,
                duration(entry.duration_ns),
                entry.path
            ),
            OutputFormat::Json => compact(entry),
        }
    }

    pub fn sql(&self, entry: &SqlEntry) -> String {
        match self.format {
            OutputFormat::Text => {
                let mut line = format!("{:>10}  ", duration(entry.duration_ns));
                if is_slow_query(entry, self.slow_query_ms) {
                    line.push_str("[slow] ");
                }
                line.push_str(&entry.query);
                if let Some(error) = entry.error.as_deref().filter(|e| !e.is_empty()) {
                    line.push_str(&format!("  !! {}", error));
                }
                line
            }
            OutputFormat::Json => compact(entry),
        }
    }

    pub fn log(&self, entry: &LogEntry) -> String {
        match self.format {
            OutputFormat::Text => {
                let mut line = format!("{:<5} ", entry.level.to_uppercase());
                if !entry.source.is_empty() {
                    line.push_str(&format!("{}: ", entry.source));
                }
                line.push_str(&entry.message);
                if !entry.fields.is_empty() {
                    line.push(' ');
                    line.push_str(&Value::Object(entry.fields.clone()).to_string());
                }
                line
            }
            OutputFormat::Json => compact(entry),
        }
    }

    pub fn route(&self, entry: &RouteEntry) -> String {
        match self.format {
            OutputFormat::Text => format!("{:<7} {:<40} {}", entry.method, entry.path, entry.handler),
            OutputFormat::Json => compact(entry),
        }
    }

    pub fn custom_log(&self, entry: &CustomLogEntry) -> String {
        match self.format {
            OutputFormat::Text if entry.label.is_empty() => entry.value.to_string(),
            OutputFormat::Text => format!("{}: {}", entry.label, entry.value),
            OutputFormat::Json => compact(entry),
        }
    }

    /// A whole JSON panel
    pub fn json(&self, value: &Value) -> String {
        match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(value).unwrap_or_default(),
            OutputFormat::Json => value.to_string(),
        }
    }
}

/// One-line connection and counter summary
pub fn status_line(status: ConnectionStatus, stats: &StoreStats, paused: bool) -> String {
    let mut line = format!("[{}] {} events", status, stats.event_count);
    if let Some(at) = stats.last_event_at {
        line.push_str(&format!(", last at {}", at.format("%H:%M:%S")));
    }
    if paused {
        line.push_str(&format!(", paused ({} dropped)", stats.dropped_while_paused));
    }
    line
}

fn duration(nanos: u64) -> String {
    format!("{:.2}ms", nanos as f64 / 1_000_000.0)
}

fn compact<T: Serialize>(row: &T) -> String {
    serde_json::to_string(row).unwrap_or_default()
}
