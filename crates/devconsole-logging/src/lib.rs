//! Centralized logging configuration for devconsole
//!
//! Wraps `tracing` and `tracing-subscriber` so every devconsole binary logs
//! the same way.
//!
//! # Usage
//!
//! ```rust,ignore
//! use devconsole_logging::{init, LogConfig, LogOutput};
//!
//! // CLI with debug flag
//! init(LogConfig::cli(true));
//!
//! // Streaming to stdout: keep logs on stderr
//! init(LogConfig::new().output(LogOutput::Stderr));
//!
//! // Daily-rotated file logging
//! let _guard = init_with_file(LogConfig::new(), Path::new("/var/log/devconsole"), "devconsole.log")?;
//! ```
//!
//! # Re-exports
//!
//! The tracing macros are re-exported so crates can `use devconsole_logging::{debug, info}`.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use devconsole_config::LoggingSection;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level};

// Re-export WorkerGuard for file logging lifetime management
pub use tracing_appender::non_blocking::WorkerGuard;

/// Output destination for logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Write logs to stderr (default: stdout carries panel output)
    #[default]
    Stderr,
    /// Write logs to stdout
    Stdout,
    /// Write logs to a file (see [`init_with_file`])
    File,
}

/// Timestamp format for log output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Use local timezone (default)
    #[default]
    Local,
    /// Use UTC timezone
    Utc,
}

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Enable debug-level logging (overrides default_level)
    pub debug: bool,
    /// Default log level when RUST_LOG is not set
    pub default_level: String,
    pub output: LogOutput,
    /// Show module target in log output
    pub show_target: bool,
    pub timestamp_format: TimestampFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
            output: LogOutput::default(),
            show_target: false,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug-level logging
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Set the default log level (used when RUST_LOG is not set)
    pub fn default_level(mut self, level: impl Into<String>) -> Self {
        self.default_level = level.into();
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Use UTC timestamps
    pub fn utc(self) -> Self {
        self.timestamp_format(TimestampFormat::Utc)
    }

    /// Use local timestamps (default)
    pub fn local(self) -> Self {
        self.timestamp_format(TimestampFormat::Local)
    }

    /// Convenience: Configure for CLI usage
    pub fn cli(debug: bool) -> Self {
        Self::new().debug(debug)
    }

    /// Convenience: Configure for tests
    pub fn test() -> Self {
        Self::new().default_level("debug")
    }

    /// Build from the `[logging]` section of the config file
    pub fn from_section(section: &LoggingSection) -> Self {
        let config = Self::new().default_level(section.level.to_ascii_lowercase());
        let config = if section.directory.is_some() {
            config.output(LogOutput::File)
        } else {
            config
        };
        if section.use_utc {
            config.utc()
        } else {
            config
        }
    }

    fn build_filter(&self) -> EnvFilter {
        if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_level))
        }
    }
}

/// Initialize the logging system with the given configuration.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Override log level (e.g., `RUST_LOG=devconsole_stream=trace`)
///
/// # Panics
///
/// Panics if called more than once (tracing can only be initialized once).
///
/// # Note
///
/// For file logging, use `init_with_file` instead.
pub fn init(config: LogConfig) {
    use tracing_subscriber::fmt::time::{LocalTime, UtcTime};

    let filter = config.build_filter();

    // Helper macro to apply timer and init (avoids type-level branching duplication)
    macro_rules! with_timer_init {
        ($builder:expr, $ts_format:expr) => {
            match $ts_format {
                TimestampFormat::Utc => $builder.with_timer(UtcTime::rfc_3339()).init(),
                TimestampFormat::Local => $builder.with_timer(LocalTime::rfc_3339()).init(),
            }
        };
    }

    match config.output {
        LogOutput::Stdout => {
            let is_tty = std::io::stdout().is_terminal();
            let builder = fmt()
                .with_env_filter(filter)
                .with_target(config.show_target)
                .with_ansi(is_tty);
            with_timer_init!(builder, config.timestamp_format);
        }
        LogOutput::Stderr | LogOutput::File => {
            // File output without a directory falls back to stderr
            let is_tty = std::io::stderr().is_terminal();
            let builder = fmt()
                .with_env_filter(filter)
                .with_target(config.show_target)
                .with_writer(std::io::stderr)
                .with_ansi(is_tty);
            with_timer_init!(builder, config.timestamp_format);
        }
    }
}

/// Initialize the logging system with daily-rotated file output.
///
/// Files are named `{file_prefix}.YYYY-MM-DD` inside `log_dir`. The returned
/// `WorkerGuard` must be held until program exit so buffered lines are
/// flushed.
///
/// # Errors
///
/// Returns an error if `log_dir` cannot be created.
///
/// # Panics
///
/// Panics if called more than once (tracing can only be initialized once).
pub fn init_with_file(
    config: LogConfig,
    log_dir: &Path,
    file_prefix: &str,
) -> std::io::Result<WorkerGuard> {
    use tracing_subscriber::fmt::time::{LocalTime, UtcTime};

    let filter = config.build_filter();

    std::fs::create_dir_all(log_dir)
        .map_err(|e| std::io::Error::other(format!("Failed to create log directory: {}", e)))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // No ANSI colors in files
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_writer(non_blocking)
        .with_ansi(false);

    match config.timestamp_format {
        TimestampFormat::Utc => builder.with_timer(UtcTime::rfc_3339()).init(),
        TimestampFormat::Local => builder.with_timer(LocalTime::rfc_3339()).init(),
    }

    Ok(guard)
}

/// Initialize logging for tests.
///
/// Uses `with_test_writer()` to capture logs in test output.
/// Safe to call multiple times (uses `try_init` internally).
pub fn init_test() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}
