use crate::retry::backoff::{ExponentialBackoff, RetryBudget};
use crate::retry::classify::{RetryAll, RetryClassifier};
use crate::retry::sleep::Sleeper;
use log::{debug, warn};
use std::fmt::Display;

/// Attempt information handed to the operation on every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// 1-based number of the attempt being made.
    pub attempt: u32,
}

/// Why [`RetryTemplate::execute`] gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every allowed attempt failed; `last` is the error of the final attempt.
    Exhausted { attempts: u32, last: E },
    /// The classifier refused to retry `error`.
    NonRetryable { attempts: u32, error: E },
    /// The sleeper was cancelled before or between attempts.
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::NonRetryable { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }
}

/// Bounded exponential retry around a fallible operation.
///
/// The template owns attempt counting, delay computation and sleeping; the
/// operation only reports success or failure.
#[derive(Debug, Clone)]
pub struct RetryTemplate<C = RetryAll> {
    max_attempts: u32,
    backoff: ExponentialBackoff,
    classifier: C,
}

impl RetryTemplate {
    /// Builds a template from the exponential half of `budget`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::{RecordingSleeper, RetryBudget, RetryTemplate};
    /// use std::time::Duration;
    ///
    /// let budget = RetryBudget::new(3, 2.0, 100, 300, 50).unwrap();
    /// let template = RetryTemplate::new(&budget);
    /// let sleeper = RecordingSleeper::new();
    ///
    /// let result: Result<&str, _> = template.execute(&sleeper, |ctx| {
    ///     if ctx.attempt < 3 { Err("broker not ready") } else { Ok("created") }
    /// });
    /// assert_eq!(result.unwrap(), "created");
    /// assert_eq!(sleeper.total(), Duration::from_millis(300));
    /// ```
    pub fn new(budget: &RetryBudget) -> Self {
        RetryTemplate {
            max_attempts: budget.max_attempts(),
            backoff: budget.exponential(),
            classifier: RetryAll,
        }
    }
}

impl<C> RetryTemplate<C> {
    /// Replaces the failure classifier, keeping the schedule.
    pub fn with_classifier<D>(self, classifier: D) -> RetryTemplate<D> {
        RetryTemplate {
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            classifier,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &ExponentialBackoff {
        &self.backoff
    }

    /// Runs `operation` until it succeeds or the budget is spent.
    ///
    /// The operation is invoked at most `max_attempts` times. After failed
    /// attempt `n` (when `n < max_attempts`) the caller is blocked for
    /// `backoff.delay_for(n)`; no delay follows the last attempt.
    pub fn execute<T, E, F, S>(&self, sleeper: &S, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(RetryContext) -> Result<T, E>,
        E: Display,
        C: RetryClassifier<E>,
        S: Sleeper + ?Sized,
    {
        let mut attempt = 1;
        loop {
            if sleeper.is_cancelled() {
                return Err(RetryError::Cancelled {
                    attempts: attempt - 1,
                });
            }

            let error = match operation(RetryContext { attempt }) {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.classifier.is_retryable(&error) {
                warn!("Attempt {} failed with a non-retryable error: {}", attempt, error);
                return Err(RetryError::NonRetryable {
                    attempts: attempt,
                    error,
                });
            }
            if attempt >= self.max_attempts {
                warn!(
                    "Attempt {} of {} failed, giving up: {}",
                    attempt, self.max_attempts, error
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: error,
                });
            }

            let delay = self.backoff.delay_for(attempt);
            warn!(
                "Attempt {} of {} failed: {}. Retrying in {:?}",
                attempt, self.max_attempts, error, delay
            );
            if sleeper.sleep(delay).is_err() {
                debug!("Retry cancelled while waiting after attempt {}", attempt);
                return Err(RetryError::Cancelled { attempts: attempt });
            }
            attempt += 1;
        }
    }
}
