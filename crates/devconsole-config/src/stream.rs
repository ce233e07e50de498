//! Stream transport configuration

use crate::constants::{
    DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_BASE_DELAY_MS, DEFAULT_RECONNECT_MAX_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Reconnect Config
// ============================================================================

/// Automatic reconnection with exponential backoff
///
/// - Attempt `n` waits `min(base_delay_ms * 2^n, max_delay_ms)`
/// - Jitter of 20-50% of that delay is added on top
/// - After `max_attempts` failed attempts the stream stays disconnected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Enable automatic reconnection
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Delay before the first reconnect attempt (ms)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum delay between attempts, before jitter (ms)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Automatic attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Buffer size of the transport event channel
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

impl ReconnectConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.base_delay_ms == 0 {
            errors.push("stream.base_delay_ms must be greater than 0".to_string());
        }
        if self.base_delay_ms > self.max_delay_ms {
            errors.push(format!(
                "stream.base_delay_ms ({}) must not exceed stream.max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ));
        }
        if self.event_channel_capacity == 0 {
            errors.push("stream.event_channel_capacity must be greater than 0".to_string());
        }
        errors
    }
}

fn default_true() -> bool {
    true
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_RECONNECT_BASE_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_RECONNECT_MAX_DELAY_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_RECONNECT_ATTEMPTS
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_policy() {
        let config = ReconnectConfig::default();
        assert!(config.enabled);
        assert_eq!(config.base_delay(), Duration::from_millis(1000));
        assert_eq!(config.max_delay(), Duration::from_millis(12000));
        assert_eq!(config.max_attempts, 8);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_base_above_max_is_invalid() {
        let config = ReconnectConfig {
            base_delay_ms: 5000,
            max_delay_ms: 1000,
            ..ReconnectConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must not exceed"));
    }
}
