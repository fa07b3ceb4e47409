//! Reconnect policy for the event stream.

use std::time::Duration;

/// What to do after a run of consecutive failed connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    Retry { after: Duration },
    GiveUp,
}

/// Capped exponential delay between failed connection attempts.
///
/// The policy holds no state; the listener counts consecutive failures and
/// resets the count once a connection starts streaming.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay after the first failure. Each further failure doubles it.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Consecutive failures tolerated before giving up. `0` never gives up.
    pub max_failures: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_failures: 0,
        }
    }
}

impl ReconnectPolicy {
    /// Decide whether to reconnect after `failures` consecutive failures.
    pub fn decide(&self, failures: u32) -> ReconnectDecision {
        if self.max_failures != 0 && failures > self.max_failures {
            ReconnectDecision::GiveUp
        } else {
            ReconnectDecision::Retry {
                after: self.delay_for(failures),
            }
        }
    }

    /// `base_delay * 2^(failures - 1)`, capped at `max_delay`.
    fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1);
        2u32.checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry_secs(policy: &ReconnectPolicy, failures: u32) -> u64 {
        match policy.decide(failures) {
            ReconnectDecision::Retry { after } => after.as_secs(),
            ReconnectDecision::GiveUp => panic!("gave up after {failures} failures"),
        }
    }

    #[test]
    fn test_delay_doubles_up_to_the_cap() {
        let policy = ReconnectPolicy::default();

        let delays: Vec<u64> = (1..=9).map(|failures| retry_secs(&policy, failures)).collect();

        assert_eq!(delays, [1, 2, 4, 8, 16, 32, 60, 60, 60]);
    }

    #[test]
    fn test_huge_failure_counts_stay_at_the_cap() {
        let policy = ReconnectPolicy::default();

        assert_eq!(retry_secs(&policy, 40), 60);
        assert_eq!(retry_secs(&policy, u32::MAX), 60);
    }

    #[test]
    fn test_custom_base_delay() {
        let policy = ReconnectPolicy {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(1),
            ..ReconnectPolicy::default()
        };

        assert_eq!(
            policy.decide(2),
            ReconnectDecision::Retry {
                after: Duration::from_millis(500)
            }
        );
        assert_eq!(
            policy.decide(5),
            ReconnectDecision::Retry {
                after: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn test_gives_up_past_max_failures() {
        let policy = ReconnectPolicy {
            max_failures: 2,
            ..ReconnectPolicy::default()
        };

        assert_eq!(retry_secs(&policy, 2), 2);
        assert_eq!(policy.decide(3), ReconnectDecision::GiveUp);
    }

    #[test]
    fn test_zero_max_failures_never_gives_up() {
        let policy = ReconnectPolicy::default();

        assert_ne!(policy.decide(10_000), ReconnectDecision::GiveUp);
    }
}
