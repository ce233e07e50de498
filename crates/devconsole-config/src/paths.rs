//! Config path discovery and home directory expansion

use crate::constants::ENV_DEVCONSOLE_CONFIG;
use std::path::{Path, PathBuf};

/// Default config filename, looked up in the working directory
pub const DEFAULT_CONFIG_FILENAME: &str = "devconsole.toml";

/// Find the config file to load.
///
/// Resolution order:
/// 1. `--config` argument (already parsed by the caller)
/// 2. `DEVCONSOLE_CONFIG` environment variable
/// 3. `./devconsole.toml`
///
/// Returns the path and a description of where it came from, for logging.
///
/// # Example
/// ```
/// use devconsole_config::paths::discover_config_path;
///
/// let (path, source) = discover_config_path(None);
/// println!("Using config from {}: {}", source, path.display());
/// ```
pub fn discover_config_path(cli_arg: Option<&Path>) -> (PathBuf, &'static str) {
    discover_config_path_from(cli_arg, std::env::var(ENV_DEVCONSOLE_CONFIG).ok())
}

fn discover_config_path_from(
    cli_arg: Option<&Path>,
    env_value: Option<String>,
) -> (PathBuf, &'static str) {
    if let Some(path) = cli_arg {
        return (expand_tilde(path), "--config CLI arg");
    }

    if let Some(config_path) = env_value.filter(|v| !v.is_empty()) {
        return (
            expand_tilde(Path::new(&config_path)),
            "DEVCONSOLE_CONFIG env var",
        );
    }

    (PathBuf::from(DEFAULT_CONFIG_FILENAME), "default location")
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a tilde, or when no home directory is known, are returned
/// unchanged.
///
/// # Example
/// ```
/// use devconsole_config::paths::expand_tilde;
/// use std::path::Path;
///
/// let plain = expand_tilde(Path::new("/etc/devconsole.toml"));
/// assert_eq!(plain, Path::new("/etc/devconsole.toml"));
/// ```
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
