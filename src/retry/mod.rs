//! Retry timing and the two loops built on it.
//!
//! [`RetryTemplate`] is the bounded exponential retry used around broker admin
//! calls. [`PollingRetry`] is the uncapped polling loop used while waiting for
//! topics to appear and for the schema registry to answer.

pub mod backoff;
pub mod cancel;
pub mod classify;
pub mod poll;
pub mod sleep;
pub mod template;

pub use backoff::{ExponentialBackoff, PollingBackoff, RetryBudget};
pub use cancel::{CancellationToken, Cancelled};
pub use classify::{FnClassifier, RetryAll, RetryClassifier};
pub use poll::{PollInterrupt, PollingRetry};
pub use sleep::{RecordingSleeper, Sleeper};
pub use template::{RetryContext, RetryError, RetryTemplate};
