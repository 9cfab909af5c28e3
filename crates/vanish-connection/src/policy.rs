//! Reconnect backoff policy.

use std::time::Duration;

/// Bounded exponential backoff for automatic reconnection.
///
/// Attempt `n` (1-indexed) waits `min(base_delay · 2^n, max_delay)`. With the
/// defaults that is 2 s, 4 s, 8 s, 10 s, 10 s, after which the manager gives
/// up until someone calls `connect()` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Automatic attempts before giving up. 0 disables reconnection.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Delay before the given attempt. Saturates instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_for_default_policy_doubles_then_caps() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u128> = (1..=5).map(|n| policy.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![2_000, 4_000, 8_000, 10_000, 10_000]);
    }

    #[test]
    fn test_delay_for_huge_attempt_saturates_at_max() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_builder_methods_override_defaults() {
        let policy = ReconnectPolicy::default()
            .with_base_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(50))
            .with_max_attempts(2);

        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(3), Duration::from_millis(50));
        assert_eq!(policy.max_attempts, 2);
    }
}
