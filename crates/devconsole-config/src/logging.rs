//! Logging configuration

use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging settings, consumed by `devconsole-logging`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,

    /// Use UTC timestamps instead of local time
    #[serde(default)]
    pub use_utc: bool,

    /// Write logs to daily-rotated files in this directory instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            use_utc: false,
            directory: None,
        }
    }
}

impl LoggingSection {
    pub fn validate(&self) -> Vec<String> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            Vec::new()
        } else {
            vec![format!(
                "logging.level '{}' must be one of {}",
                self.level,
                LEVELS.join(", ")
            )]
        }
    }
}

fn default_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
