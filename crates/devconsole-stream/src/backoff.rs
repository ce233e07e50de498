//! Reconnect backoff
//!
//! Pure functions so the policy can be tested without timers.

use std::time::Duration;

/// Exponential backoff for `attempt` (0-based): `min(base * 2^attempt, max)`
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max).min(max)
}

/// Jitter for a backoff `delay`, in `[0.2 * delay, 0.5 * delay)`.
///
/// `unit` is a uniform sample from `[0, 1)`; out-of-range samples are treated
/// as 0.
pub fn jitter(delay: Duration, unit: f64) -> Duration {
    let unit = if (0.0..1.0).contains(&unit) { unit } else { 0.0 };

    let nanos = u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX);
    let low = nanos / 5;
    let span = nanos / 10 * 3;
    let offset = ((unit * span as f64) as u64).min(span.saturating_sub(1));

    Duration::from_nanos(low + offset)
}

/// Full delay before reconnect attempt `attempt`: backoff plus random jitter
pub fn reconnect_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let delay = backoff_delay(attempt, base, max);
    delay + jitter(delay, rand::random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(1000);
    const MAX: Duration = Duration::from_millis(12000);

    #[test]
    fn test_backoff_doubles_then_caps() {
        let delays: Vec<u64> = (0..6)
            .map(|a| backoff_delay(a, BASE, MAX).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 12000, 12000]);
    }

    #[test]
    fn test_backoff_huge_attempt_saturates_at_max() {
        assert_eq!(backoff_delay(64, BASE, MAX), MAX);
        assert_eq!(backoff_delay(u32::MAX, BASE, MAX), MAX);
    }

    #[test]
    fn test_jitter_bounds_at_extremes() {
        let delay = Duration::from_millis(1000);
        assert_eq!(jitter(delay, 0.0), Duration::from_millis(200));
        assert!(jitter(delay, 0.999_999_999) < Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_out_of_range_unit_is_minimum() {
        let delay = Duration::from_millis(1000);
        assert_eq!(jitter(delay, 1.0), Duration::from_millis(200));
        assert_eq!(jitter(delay, -0.5), Duration::from_millis(200));
        assert_eq!(jitter(delay, f64::NAN), Duration::from_millis(200));
    }

    #[test]
    fn test_reconnect_delay_within_envelope() {
        for attempt in 0..10 {
            let backoff = backoff_delay(attempt, BASE, MAX);
            let delay = reconnect_delay(attempt, BASE, MAX);
            assert!(delay >= backoff + backoff / 5);
            assert!(delay < backoff + backoff / 2);
        }
    }
}
