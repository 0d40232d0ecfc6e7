use crate::retry::backoff::{PollingBackoff, RetryBudget};
use crate::retry::sleep::Sleeper;
use log::debug;
use std::time::Duration;

/// Why a polling loop stopped without its condition becoming true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollInterrupt {
    /// The check failed on the last permitted attempt.
    Exhausted { attempts: u32 },
    /// The sleeper was cancelled; `attempts` checks had been made.
    Cancelled { attempts: u32 },
}

/// Attempt counter for the uncapped polling discipline.
///
/// The counter starts at 1 and is compared with `max_attempts` before every
/// delay: a failure on the last permitted attempt ends the loop without
/// sleeping again. One counter may span several conditions, so a caller that
/// waits for a sequence of things shares one budget across all of them.
#[derive(Debug, Clone)]
pub struct PollingRetry {
    max_attempts: u32,
    backoff: PollingBackoff,
    attempt: u32,
}

impl PollingRetry {
    pub fn new(budget: &RetryBudget) -> Self {
        PollingRetry {
            max_attempts: budget.max_attempts(),
            backoff: budget.polling(),
            attempt: 1,
        }
    }

    /// The 1-based number of the check currently being made.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay that follows a failure of the current attempt.
    pub fn next_delay(&self) -> Duration {
        self.backoff.delay_for(self.attempt)
    }

    /// Records a failed check, then sleeps before the next one.
    ///
    /// Returns [`PollInterrupt::Exhausted`] without sleeping when the failed
    /// check was the last permitted one.
    pub fn backoff_after_failure<S: Sleeper + ?Sized>(
        &mut self,
        sleeper: &S,
    ) -> Result<(), PollInterrupt> {
        if self.attempt >= self.max_attempts {
            return Err(PollInterrupt::Exhausted {
                attempts: self.attempt,
            });
        }
        let delay = self.next_delay();
        debug!(
            "Check {} of {} failed, polling again in {:?}",
            self.attempt, self.max_attempts, delay
        );
        sleeper.sleep(delay).map_err(|_| PollInterrupt::Cancelled {
            attempts: self.attempt,
        })?;
        self.attempt += 1;
        Ok(())
    }

    /// Polls `check` until it returns `true` or the budget runs out.
    ///
    /// Returns the number of checks made.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::{PollInterrupt, PollingRetry, RecordingSleeper, RetryBudget};
    /// use std::time::Duration;
    ///
    /// let budget = RetryBudget::new(2, 2.0, 100, 1000, 50).unwrap();
    /// let sleeper = RecordingSleeper::new();
    /// let outcome = PollingRetry::new(&budget).poll_until(&sleeper, |_| false);
    ///
    /// assert_eq!(outcome, Err(PollInterrupt::Exhausted { attempts: 2 }));
    /// assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(50)]);
    /// ```
    pub fn poll_until<S, F>(mut self, sleeper: &S, mut check: F) -> Result<u32, PollInterrupt>
    where
        S: Sleeper + ?Sized,
        F: FnMut(u32) -> bool,
    {
        loop {
            if sleeper.is_cancelled() {
                return Err(PollInterrupt::Cancelled {
                    attempts: self.attempt - 1,
                });
            }
            if check(self.attempt) {
                return Ok(self.attempt);
            }
            self.backoff_after_failure(sleeper)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::sleep::RecordingSleeper;

    fn budget(max_attempts: u32, sleep_time_ms: u64, multiplier: f64) -> RetryBudget {
        RetryBudget::new(max_attempts, multiplier, 1, 1, sleep_time_ms).unwrap()
    }

    #[test]
    fn test_condition_true_immediately() {
        let sleeper = RecordingSleeper::new();
        let result = PollingRetry::new(&budget(3, 50, 2.0)).poll_until(&sleeper, |_| true);
        assert_eq!(result, Ok(1));
        assert!(sleeper.sleeps().is_empty());
    }

    #[test]
    fn test_never_true_sleeps_between_checks_only() {
        let sleeper = RecordingSleeper::new();
        let mut checks = Vec::new();
        let result = PollingRetry::new(&budget(2, 50, 2.0)).poll_until(&sleeper, |attempt| {
            checks.push(attempt);
            false
        });

        assert_eq!(result, Err(PollInterrupt::Exhausted { attempts: 2 }));
        assert_eq!(checks, vec![1, 2]);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(50)]);
    }

    #[test]
    fn test_delays_grow_without_cap() {
        let sleeper = RecordingSleeper::new();
        let result = PollingRetry::new(&budget(5, 10, 3.0)).poll_until(&sleeper, |attempt| attempt == 5);

        assert_eq!(result, Ok(5));
        assert_eq!(
            sleeper.sleeps(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(30),
                Duration::from_millis(90),
                Duration::from_millis(270)
            ]
        );
    }

    #[test]
    fn test_counter_spans_multiple_conditions() {
        let sleeper = RecordingSleeper::new();
        let mut poll = PollingRetry::new(&budget(3, 10, 2.0));

        poll.backoff_after_failure(&sleeper).unwrap();
        assert_eq!(poll.attempt(), 2);
        poll.backoff_after_failure(&sleeper).unwrap();
        assert_eq!(poll.attempt(), 3);
        assert_eq!(
            poll.backoff_after_failure(&sleeper),
            Err(PollInterrupt::Exhausted { attempts: 3 })
        );
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[test]
    fn test_cancel_during_sleep_reports_checks_made() {
        let sleeper = RecordingSleeper::cancel_after(1);
        let result = PollingRetry::new(&budget(10, 10, 2.0)).poll_until(&sleeper, |_| false);
        assert_eq!(result, Err(PollInterrupt::Cancelled { attempts: 2 }));
    }

    #[test]
    fn test_cancelled_before_first_check() {
        let sleeper = RecordingSleeper::new();
        sleeper.cancel();
        let mut called = false;
        let result = PollingRetry::new(&budget(3, 10, 2.0)).poll_until(&sleeper, |_| {
            called = true;
            true
        });
        assert_eq!(result, Err(PollInterrupt::Cancelled { attempts: 0 }));
        assert!(!called);
    }
}
