//! Delay schedule for repeated ledger lookups.

use std::time::Duration;

use rand::Rng;

use crate::config::ConfirmationConfig;

/// Exponential delays, capped, with up to 10% jitter on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    pub fn from_config(config: &ConfirmationConfig) -> Self {
        Self::new(config.base_delay_ms, config.max_delay_ms)
    }

    /// Delay before `attempt` (1-based) without jitter. Attempt 0 is immediate.
    pub fn nominal_ms(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return 0;
        }
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        self.base_ms.saturating_mul(factor).min(self.max_ms)
    }

    /// Delay before `attempt`, jittered.
    pub fn delay(&self, attempt: u32) -> Duration {
        let nominal = self.nominal_ms(attempt);
        let spread = nominal / 10;
        let jitter = match spread {
            0 => 0,
            n => rand::thread_rng().gen_range(0..n),
        };
        Duration::from_millis(nominal + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_doubles_until_cap() {
        let backoff = Backoff::new(1000, 5000);
        let schedule: Vec<u64> = (0..=5).map(|a| backoff.nominal_ms(a)).collect();
        assert_eq!(schedule, vec![0, 1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let backoff = Backoff::new(1000, 5000);
        for attempt in 1..=4 {
            let nominal = backoff.nominal_ms(attempt) as u128;
            let delay = backoff.delay(attempt).as_millis();
            assert!(delay >= nominal && delay < nominal + nominal / 10 + 1);
        }
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let backoff = Backoff::new(1000, 5000);
        assert_eq!(backoff.nominal_ms(200), 5000);
    }

    #[test]
    fn test_zero_base_never_waits() {
        let backoff = Backoff::from_config(&ConfirmationConfig {
            max_attempts: 3,
            base_delay_ms: 0,
            max_delay_ms: 0,
        });
        assert_eq!(backoff.delay(3), Duration::ZERO);
    }
}
