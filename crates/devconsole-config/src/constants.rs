//! Default constants for devconsole configuration
//!
//! Single source of truth for default values. Everything that is
//! configurable has its default here.
//!
//! # Organization
//!
//! - Endpoint: server location and paths
//! - Capacities: per-panel ring buffer sizes
//! - Thresholds: SQL slow-query classification
//! - Timeouts: HTTP request timeouts
//! - Retry/Reconnection: backoff behavior
//! - Channel Capacities: internal channel buffer sizes
//! - Environment variables

// ============================================================================
// ENDPOINT
// ============================================================================

/// Default server base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Path of the duplex event stream, relative to the base URL
pub const STREAM_PATH: &str = "ws";

/// Path of the HTTP snapshot endpoint
pub const SNAPSHOT_PATH: &str = "api/snapshot";

/// Path of the HTTP clear endpoint (`/{panel}` appended for a single panel)
pub const CLEAR_PATH: &str = "api/clear";

// ============================================================================
// CAPACITIES
// ============================================================================

/// Maximum retained request entries
pub const DEFAULT_MAX_REQUESTS: usize = 500;

/// Maximum retained SQL entries
pub const DEFAULT_MAX_SQL: usize = 200;

/// Maximum retained log entries
pub const DEFAULT_MAX_LOGS: usize = 500;

/// Maximum retained custom log entries
pub const DEFAULT_MAX_CUSTOM_LOGS: usize = 500;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// SQL statements at or above this duration (ms) are "slow"
pub const DEFAULT_SLOW_QUERY_MS: u64 = 100;

// ============================================================================
// TIMEOUTS
// ============================================================================

/// Timeout for the best-effort HTTP calls (snapshot fetch, clear)
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// RETRY / RECONNECTION
// ============================================================================

/// First reconnect delay before jitter (ms)
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1_000;

/// Upper bound on the reconnect delay before jitter (ms)
pub const DEFAULT_RECONNECT_MAX_DELAY_MS: u64 = 12_000;

/// Automatic reconnect attempts before giving up
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 8;

// ============================================================================
// CHANNEL CAPACITIES
// ============================================================================

/// Transport -> controller event channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1_024;

// ============================================================================
// LOGGING
// ============================================================================

/// Default log level when RUST_LOG is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Config file path override
pub const ENV_DEVCONSOLE_CONFIG: &str = "DEVCONSOLE_CONFIG";

/// Base URL override
pub const ENV_DEVCONSOLE_BASE_URL: &str = "DEVCONSOLE_BASE_URL";

/// Slow query threshold override (ms)
pub const ENV_DEVCONSOLE_SLOW_QUERY_MS: &str = "DEVCONSOLE_SLOW_QUERY_MS";
