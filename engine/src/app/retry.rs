//! Retry policy for upstream page fetches.

use std::time::Duration;

use rand::Rng;

/// Bounded exponential backoff with an upstream override.
///
/// Kept as a standalone value so the schedule is testable without a
/// network or a real clock.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per page, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the random jitter added to each computed wait.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (0-based, so the wait after the
    /// first failure is `delay(0, ..)`). A `retry_after` hint from the
    /// upstream replaces the computed backoff; both respect `max_delay`.
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let wait = match retry_after {
            Some(hint) => hint,
            None => {
                self.base_delay.saturating_mul(2u32.saturating_pow(attempt)) + self.jitter_amount()
            }
        };
        wait.min(self.max_delay)
    }

    fn jitter_amount(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Millisecond-scale schedule for tests that exercise real retries.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = no_jitter();
        assert_eq!(policy.delay(0, None), Duration::from_millis(500));
        assert_eq!(policy.delay(1, None), Duration::from_millis(1000));
        assert_eq!(policy.delay(2, None), Duration::from_millis(2000));
    }

    #[test]
    fn backoff_is_capped() {
        let policy = no_jitter();
        assert_eq!(policy.delay(10, None), Duration::from_secs(10));
    }

    #[test]
    fn retry_after_overrides_backoff() {
        let policy = no_jitter();
        let hint = Some(Duration::from_secs(7));
        assert_eq!(policy.delay(0, hint), Duration::from_secs(7));
    }

    #[test]
    fn retry_after_is_still_capped() {
        let policy = no_jitter();
        let hint = Some(Duration::from_secs(600));
        assert_eq!(policy.delay(0, hint), Duration::from_secs(10));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = RetryPolicy {
            jitter: Duration::from_millis(100),
            ..no_jitter()
        };
        for _ in 0..50 {
            let wait = policy.delay(0, None);
            assert!(wait >= Duration::from_millis(500));
            assert!(wait <= Duration::from_millis(600));
        }
    }
}
