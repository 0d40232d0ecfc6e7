use crate::retry::cancel::{CancellationToken, Cancelled};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Blocking delay used between retry attempts.
///
/// Delay computation lives in the backoff types; implementors only own the
/// waiting side effect and its interruption.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;

    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Sleeper for CancellationToken {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        CancellationToken::sleep(self, duration)
    }

    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        (**self).sleep(duration)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<S: Sleeper + ?Sized> Sleeper for Box<S> {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        (**self).sleep(duration)
    }

    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Sleeper that records requested delays without blocking.
///
/// Clones share the same log, so a handle kept by the caller sees the delays
/// requested by a retry loop that owns another clone. Used for deterministic
/// tests, benchmarks and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    inner: Arc<Mutex<Recording>>,
}

#[derive(Debug, Default)]
struct Recording {
    sleeps: Vec<Duration>,
    cancel_after: Option<usize>,
    cancelled: bool,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `sleeps` delays through, then cancels on the next one.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::retry::{RecordingSleeper, Sleeper};
    /// use std::time::Duration;
    ///
    /// let sleeper = RecordingSleeper::cancel_after(1);
    /// assert!(sleeper.sleep(Duration::from_millis(10)).is_ok());
    /// assert!(sleeper.sleep(Duration::from_millis(20)).is_err());
    /// assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(10)]);
    /// ```
    pub fn cancel_after(sleeps: usize) -> Self {
        let sleeper = Self::default();
        sleeper.recording().cancel_after = Some(sleeps);
        sleeper
    }

    pub fn cancel(&self) {
        self.recording().cancelled = true;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.recording().sleeps.clone()
    }

    pub fn total(&self) -> Duration {
        self.recording().sleeps.iter().sum()
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        let mut recording = self.recording();
        if recording.cancel_after == Some(recording.sleeps.len()) {
            recording.cancelled = true;
        }
        if recording.cancelled {
            return Err(Cancelled);
        }
        recording.sleeps.push(duration);
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.recording().cancelled
    }
}
