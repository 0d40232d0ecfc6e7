use std::time::Duration;
use thiserror::Error;

/// Failure reported by a broker admin API call.
///
/// Every variant is treated as transient by the default retry classifier,
/// including the ones a smarter caller could fail fast on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminApiError {
    /// The broker refused to re-create an existing topic.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::AdminApiError;
    ///
    /// let error = AdminApiError::TopicAlreadyExists("tweets".to_string());
    /// assert_eq!(format!("{}", error), "Topic 'tweets' already exists");
    /// ```
    #[error("Topic '{0}' already exists")]
    TopicAlreadyExists(String),
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),
    #[error("Invalid replication factor: {0}")]
    InvalidReplicationFactor(String),
    #[error("Broker not available: {0}")]
    BrokerNotAvailable(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Transport error: {0}")]
    Transport(String),
}
