//! Configuration file loading and validation
//!
//! - [`load_config`] - Strict loader, errors if the file is missing
//! - [`load_config_or_default`] - Defaults when the discovered file is absent
//! - [`load_config_from_str`] - Parse and validate TOML content
//!
//! # Usage
//!
//! ```rust,ignore
//! use devconsole_config::{load_config, paths::discover_config_path};
//!
//! let (path, source) = discover_config_path(None);
//! let config = load_config(&path)?.with_env_overrides();
//! ```

use crate::ConsoleConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors that can occur during config loading
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file (strict)
///
/// # Returns
/// * `Ok(ConsoleConfig)` - Parsed and validated configuration
/// * `Err(ConfigError::NotFound)` - File does not exist
/// * `Err(ConfigError)` - Failed to read, parse or validate
pub fn load_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    debug!(path = %path.display(), "Loading config file");
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration, falling back to defaults when the file is missing.
///
/// Only a missing file falls back; an unreadable or invalid file is still an
/// error.
pub fn load_config_or_default(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    match load_config(path) {
        Err(ConfigError::NotFound(missing)) => {
            debug!(path = %missing.display(), "No config file, using defaults");
            Ok(ConsoleConfig::default())
        }
        other => other,
    }
}

/// Load configuration from a TOML string
pub fn load_config_from_str(content: &str) -> Result<ConsoleConfig, ConfigError> {
    let config: ConsoleConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration values, reporting every problem at once
pub fn validate_config(config: &ConsoleConfig) -> Result<(), ConfigError> {
    let all_errors = config.validate();

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(all_errors.join("; ")))
    }
}
