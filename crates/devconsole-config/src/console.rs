//! Console (panel) configuration

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_MAX_CUSTOM_LOGS, DEFAULT_MAX_LOGS,
    DEFAULT_MAX_REQUESTS, DEFAULT_MAX_SQL, DEFAULT_SLOW_QUERY_MS,
};
use devconsole_core::PanelKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Console Config
// ============================================================================

/// Settings read once when a console session starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSection {
    /// Server base URL; the stream lives at `{base_url}/ws`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ordered panel list. Names outside the built-ins retain the latest
    /// payload of the envelope type with the same name.
    #[serde(default = "PanelKind::builtin_names")]
    pub panels: Vec<String>,

    /// Per-panel ring buffer capacities
    #[serde(default)]
    pub capacities: Capacities,

    /// SQL statements at or above this many milliseconds are "slow"
    #[serde(default = "default_slow_query_ms")]
    pub slow_query_ms: u64,

    /// Timeout for the snapshot fetch and clear calls (milliseconds)
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

impl Default for ConsoleSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            panels: PanelKind::builtin_names(),
            capacities: Capacities::default(),
            slow_query_ms: default_slow_query_ms(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl ConsoleSection {
    /// Whether `name` is in the configured panel list
    pub fn has_panel(&self, name: &str) -> bool {
        self.panels.iter().any(|p| p == name)
    }

    /// Validate, returning one message per problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "console.base_url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!(
                "console.base_url '{}' is not a valid URL: {}",
                self.base_url, e
            )),
        }

        let mut seen = HashSet::new();
        for panel in &self.panels {
            if panel.is_empty() {
                errors.push("console.panels must not contain empty names".to_string());
            } else if !seen.insert(panel.as_str()) {
                errors.push(format!("console.panels lists '{}' more than once", panel));
            }
        }

        errors.extend(self.capacities.validate());
        errors
    }
}

// ============================================================================
// Capacities
// ============================================================================

/// Ring buffer capacity per list panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    #[serde(default = "default_max_requests")]
    pub requests: usize,

    #[serde(default = "default_max_sql")]
    pub sql: usize,

    #[serde(default = "default_max_logs")]
    pub logs: usize,

    #[serde(default = "default_max_custom_logs")]
    pub custom_logs: usize,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            requests: default_max_requests(),
            sql: default_max_sql(),
            logs: default_max_logs(),
            custom_logs: default_max_custom_logs(),
        }
    }
}

impl Capacities {
    fn validate(&self) -> Vec<String> {
        [
            ("requests", self.requests),
            ("sql", self.sql),
            ("logs", self.logs),
            ("custom_logs", self.custom_logs),
        ]
        .into_iter()
        .filter(|(_, cap)| *cap == 0)
        .map(|(name, _)| format!("console.capacities.{} must be greater than 0", name))
        .collect()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_slow_query_ms() -> u64 {
    DEFAULT_SLOW_QUERY_MS
}

fn default_http_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_max_requests() -> usize {
    DEFAULT_MAX_REQUESTS
}

fn default_max_sql() -> usize {
    DEFAULT_MAX_SQL
}

fn default_max_logs() -> usize {
    DEFAULT_MAX_LOGS
}

fn default_max_custom_logs() -> usize {
    DEFAULT_MAX_CUSTOM_LOGS
}
