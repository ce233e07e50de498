//! Root configuration type

use crate::console::ConsoleSection;
use crate::constants::{ENV_DEVCONSOLE_BASE_URL, ENV_DEVCONSOLE_SLOW_QUERY_MS};
use crate::logging::LoggingSection;
use crate::stream::ReconnectConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Complete devconsole configuration (`devconsole.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub console: ConsoleSection,

    #[serde(default)]
    pub stream: ReconnectConfig,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl ConsoleConfig {
    /// Apply environment variable overrides.
    ///
    /// Environment variables take precedence over file values.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_DEVCONSOLE_BASE_URL).filter(|v| !v.is_empty()) {
            debug!(base_url = %url, "Base URL overridden from environment");
            self.console.base_url = url;
        }

        if let Some(raw) = lookup(ENV_DEVCONSOLE_SLOW_QUERY_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.console.slow_query_ms = ms,
                Err(_) => warn!(
                    value = %raw,
                    var = ENV_DEVCONSOLE_SLOW_QUERY_MS,
                    "Ignoring non-numeric slow query override"
                ),
            }
        }

        self
    }

    /// Validate every section, returning all problems found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.console.validate();
        errors.extend(self.stream.validate());
        errors.extend(self.logging.validate());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_overrides_apply() {
        let env = vars(&[
            (ENV_DEVCONSOLE_BASE_URL, "https://staging.local"),
            (ENV_DEVCONSOLE_SLOW_QUERY_MS, "250"),
        ]);
        let config = ConsoleConfig::default().with_overrides_from(|k| env.get(k).cloned());
        assert_eq!(config.console.base_url, "https://staging.local");
        assert_eq!(config.console.slow_query_ms, 250);
    }

    #[test]
    fn test_invalid_and_empty_overrides_ignored() {
        let env = vars(&[
            (ENV_DEVCONSOLE_BASE_URL, ""),
            (ENV_DEVCONSOLE_SLOW_QUERY_MS, "fast"),
        ]);
        let config = ConsoleConfig::default().with_overrides_from(|k| env.get(k).cloned());
        assert_eq!(config, ConsoleConfig::default());
    }
}
