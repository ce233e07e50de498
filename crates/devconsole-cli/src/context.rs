//! Client Context - configuration shared by every command
//!
//! Created once at startup, passed to all commands.

use devconsole_config::paths::discover_config_path;
use devconsole_config::{
    load_config, load_config_or_default, validate_config, ConfigError, ConsoleConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared context for CLI commands
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Effective configuration: file, then environment, then CLI overrides
    pub config: Arc<ConsoleConfig>,
    /// Path the config was looked up at (it may not exist)
    pub config_path: PathBuf,
    /// Where the path came from (CLI arg, env var, or default)
    pub config_source: &'static str,
}

impl ClientContext {
    /// Discover and load the configuration.
    ///
    /// An explicitly named file (`--config` or `DEVCONSOLE_CONFIG`) must
    /// exist; a missing `./devconsole.toml` means defaults.
    pub fn load(
        cli_config: Option<&Path>,
        base_url: Option<String>,
    ) -> Result<Self, ClientContextError> {
        let (config_path, config_source) = discover_config_path(cli_config);
        let loaded = if config_source == "default location" {
            load_config_or_default(&config_path)
        } else {
            load_config(&config_path)
        };
        let config = loaded.map_err(|source| ClientContextError::ConfigLoad {
            path: config_path.clone(),
            source,
        })?;

        let mut config = config.with_env_overrides();
        if let Some(url) = base_url {
            config.console.base_url = url;
        }
        validate_config(&config).map_err(|source| ClientContextError::ConfigLoad {
            path: config_path.clone(),
            source,
        })?;

        Ok(Self {
            config: Arc::new(config),
            config_path,
            config_source,
        })
    }
}

/// Errors that can occur when creating the client context
#[derive(Debug, thiserror::Error)]
pub enum ClientContextError {
    #[error("Failed to load config from {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}
