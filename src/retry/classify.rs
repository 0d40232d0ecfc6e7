/// Decides whether a failed attempt may be retried.
///
/// The retry engine consults this once per failure; a `false` answer ends the
/// loop immediately with the failing error.
pub trait RetryClassifier<E: ?Sized> {
    fn is_retryable(&self, error: &E) -> bool;
}

/// Treats every failure as transient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryAll;

impl<E: ?Sized> RetryClassifier<E> for RetryAll {
    fn is_retryable(&self, _error: &E) -> bool {
        true
    }
}

/// Adapts a predicate into a [`RetryClassifier`].
///
/// # Examples
///
/// ```
/// use kafka_admin::admin::AdminApiError;
/// use kafka_admin::retry::{FnClassifier, RetryClassifier};
///
/// let fail_fast = FnClassifier(|err: &AdminApiError| !matches!(err, AdminApiError::InvalidTopic(_)));
/// assert!(!fail_fast.is_retryable(&AdminApiError::InvalidTopic("a b".into())));
/// assert!(fail_fast.is_retryable(&AdminApiError::BrokerNotAvailable("down".into())));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnClassifier<F>(pub F);

impl<E: ?Sized, F> RetryClassifier<E> for FnClassifier<F>
where
    F: Fn(&E) -> bool,
{
    fn is_retryable(&self, error: &E) -> bool {
        (self.0)(error)
    }
}
