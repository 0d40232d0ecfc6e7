use crate::config::ConfigError;
use std::time::Duration;

/// Retry budget shared by every retry loop.
///
/// The same shape drives both disciplines: [`ExponentialBackoff`] reads
/// `initial_interval_ms`, `max_interval_ms` and `multiplier`, while
/// [`PollingBackoff`] reads `sleep_time_ms` and the truncated `multiplier`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryBudget {
    max_attempts: u32,
    multiplier: f64,
    initial_interval_ms: u64,
    max_interval_ms: u64,
    sleep_time_ms: u64,
}

impl RetryBudget {
    /// Creates a validated retry budget.
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Total number of attempts, at least 1.
    /// * `multiplier` - Delay growth factor, finite and greater than 0.
    /// * `initial_interval_ms` - First delay of the exponential discipline.
    /// * `max_interval_ms` - Cap of the exponential discipline.
    /// * `sleep_time_ms` - First delay of the polling discipline.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::RetryBudget;
    ///
    /// let budget = RetryBudget::new(3, 2.0, 100, 300, 50).unwrap();
    /// assert_eq!(budget.max_attempts(), 3);
    /// assert!(RetryBudget::new(0, 2.0, 100, 300, 50).is_err());
    /// ```
    pub fn new(
        max_attempts: u32,
        multiplier: f64,
        initial_interval_ms: u64,
        max_interval_ms: u64,
        sleep_time_ms: u64,
    ) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max-attempts must be at least 1".to_string(),
            ));
        }
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "multiplier must be a finite number greater than 0, got {}",
                multiplier
            )));
        }
        Ok(RetryBudget {
            max_attempts,
            multiplier,
            initial_interval_ms,
            max_interval_ms,
            sleep_time_ms,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn sleep_time(&self) -> Duration {
        Duration::from_millis(self.sleep_time_ms)
    }

    /// Bounded exponential discipline used around admin API calls.
    pub fn exponential(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.initial_interval_ms,
            self.multiplier,
            self.max_interval_ms,
        )
    }

    /// Uncapped polling discipline used by the existence and health loops.
    pub fn polling(&self) -> PollingBackoff {
        PollingBackoff::new(self.sleep_time_ms, self.multiplier)
    }
}

/// Delay schedule `min(initial * multiplier^(attempt-1), max)`.
///
/// Multipliers below 1 are raised to 1 so the schedule never shrinks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    initial_interval_ms: u64,
    multiplier: f64,
    max_interval_ms: u64,
}

impl ExponentialBackoff {
    pub fn new(initial_interval_ms: u64, multiplier: f64, max_interval_ms: u64) -> Self {
        ExponentialBackoff {
            initial_interval_ms,
            multiplier: if multiplier > 1.0 { multiplier } else { 1.0 },
            max_interval_ms,
        }
    }

    /// Returns the delay to wait after the given failed attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::ExponentialBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = ExponentialBackoff::new(100, 2.0, 300);
    /// assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
    /// assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
    /// assert_eq!(backoff.delay_for(3), Duration::from_millis(300));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let cap = self.max_interval_ms as f64;
        let raw = self.initial_interval_ms as f64 * self.multiplier.powf(exponent as f64);
        let millis = if raw.is_finite() { raw.min(cap) } else { cap };
        Duration::from_millis(millis.round() as u64)
    }
}

/// Delay schedule `sleep * trunc(multiplier)^(attempt-1)` with no cap.
///
/// Saturates at `u64::MAX` milliseconds instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingBackoff {
    sleep_time_ms: u64,
    factor: u64,
}

impl PollingBackoff {
    pub fn new(sleep_time_ms: u64, multiplier: f64) -> Self {
        PollingBackoff {
            sleep_time_ms,
            factor: multiplier.trunc() as u64,
        }
    }

    pub fn factor(&self) -> u64 {
        self.factor
    }

    /// Returns the delay to wait after the given failed check.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::PollingBackoff;
    /// use std::time::Duration;
    ///
    /// let backoff = PollingBackoff::new(50, 2.7);
    /// assert_eq!(backoff.delay_for(1), Duration::from_millis(50));
    /// assert_eq!(backoff.delay_for(4), Duration::from_millis(400));
    /// ```
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.sleep_time_ms == 0 {
            return Duration::ZERO;
        }
        let exponent = attempt.max(1) - 1;
        let millis = self
            .factor
            .checked_pow(exponent)
            .and_then(|growth| self.sleep_time_ms.checked_mul(growth))
            .unwrap_or(u64::MAX);
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_budget_rejects_zero_attempts() {
        let result = RetryBudget::new(0, 2.0, 100, 1000, 100);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_budget_rejects_bad_multiplier() {
        assert!(RetryBudget::new(3, 0.0, 100, 1000, 100).is_err());
        assert!(RetryBudget::new(3, -1.5, 100, 1000, 100).is_err());
        assert!(RetryBudget::new(3, f64::NAN, 100, 1000, 100).is_err());
        assert!(RetryBudget::new(3, f64::INFINITY, 100, 1000, 100).is_err());
    }

    #[test]
    fn test_budget_accessors() {
        let budget = RetryBudget::new(5, 1.5, 250, 5000, 75).unwrap();
        assert_eq!(budget.max_attempts(), 5);
        assert_eq!(budget.multiplier(), 1.5);
        assert_eq!(budget.initial_interval(), ms(250));
        assert_eq!(budget.max_interval(), ms(5000));
        assert_eq!(budget.sleep_time(), ms(75));
    }

    #[test]
    fn test_exponential_follows_formula_until_cap() {
        let backoff = ExponentialBackoff::new(100, 2.0, 1000);
        let delays: Vec<Duration> = (1..=6).map(|n| backoff.delay_for(n)).collect();
        assert_eq!(
            delays,
            vec![ms(100), ms(200), ms(400), ms(800), ms(1000), ms(1000)]
        );
    }

    #[test]
    fn test_exponential_is_non_decreasing_and_bounded() {
        let backoff = ExponentialBackoff::new(7, 1.3, 900);
        let mut previous = Duration::ZERO;
        for attempt in 1..200 {
            let delay = backoff.delay_for(attempt);
            assert!(delay >= previous);
            assert!(delay <= ms(900));
            previous = delay;
        }
        assert_eq!(backoff.delay_for(u32::MAX), ms(900));
    }

    #[test]
    fn test_exponential_initial_above_cap_is_capped() {
        let backoff = ExponentialBackoff::new(5000, 2.0, 300);
        assert_eq!(backoff.delay_for(1), ms(300));
    }

    #[test]
    fn test_exponential_multiplier_below_one_is_constant() {
        let backoff = ExponentialBackoff::new(100, 0.5, 1000);
        assert_eq!(backoff.delay_for(1), ms(100));
        assert_eq!(backoff.delay_for(5), ms(100));
    }

    #[test]
    fn test_exponential_attempt_zero_treated_as_first() {
        let backoff = ExponentialBackoff::new(100, 2.0, 1000);
        assert_eq!(backoff.delay_for(0), backoff.delay_for(1));
    }

    #[test]
    fn test_polling_truncates_multiplier() {
        let backoff = PollingBackoff::new(50, 2.9);
        assert_eq!(backoff.factor(), 2);
        assert_eq!(backoff.delay_for(1), ms(50));
        assert_eq!(backoff.delay_for(2), ms(100));
        assert_eq!(backoff.delay_for(3), ms(200));
    }

    #[test]
    fn test_polling_is_strictly_increasing_and_uncapped() {
        let backoff = PollingBackoff::new(10, 3.0);
        let mut previous = Duration::ZERO;
        for attempt in 1..20 {
            let delay = backoff.delay_for(attempt);
            assert!(delay > previous);
            previous = delay;
        }
        assert_eq!(backoff.delay_for(11), ms(10 * 3u64.pow(10)));
    }

    #[test]
    fn test_polling_saturates_instead_of_overflowing() {
        let backoff = PollingBackoff::new(1000, 10.0);
        assert_eq!(backoff.delay_for(40), ms(u64::MAX));
    }

    #[test]
    fn test_polling_fractional_multiplier_below_two() {
        let constant = PollingBackoff::new(40, 1.5);
        assert_eq!(constant.delay_for(1), ms(40));
        assert_eq!(constant.delay_for(9), ms(40));

        let collapsing = PollingBackoff::new(40, 0.5);
        assert_eq!(collapsing.delay_for(1), ms(40));
        assert_eq!(collapsing.delay_for(2), Duration::ZERO);
    }

    #[test]
    fn test_budget_builds_both_disciplines() {
        let budget = RetryBudget::new(3, 2.0, 100, 300, 50).unwrap();
        assert_eq!(budget.exponential().delay_for(3), ms(300));
        assert_eq!(budget.polling().delay_for(3), ms(200));
    }
}
