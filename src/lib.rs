//! Kafka topic provisioning and readiness gate.
//!
//! A service that produces to Kafka calls [`ProvisioningOrchestrator::initialize`]
//! once at startup. The call creates the configured topics, waits until the
//! cluster reports every one of them, and polls the schema registry until it
//! answers healthy. Admin calls are retried with a bounded exponential backoff;
//! the waits use an uncapped polling backoff.
//!
//! # Examples
//!
//! ```
//! use kafka_admin::prelude::*;
//! use std::sync::Arc;
//!
//! let cluster = Arc::new(InMemoryCluster::new(3));
//! let budget = RetryBudget::new(3, 2.0, 100, 1000, 50).unwrap();
//! let plan = ProvisioningPlan {
//!     topics: TopicSpec::from_names(["twitter-topic"], 3, 3).unwrap(),
//!     registry_url: "http://localhost:8081".to_string(),
//!     poll_budget: budget.clone(),
//! };
//!
//! let mut orchestrator = ProvisioningOrchestrator::new(
//!     AdminGateway::new(cluster.clone(), &budget),
//!     ReadinessProber::with_timeout(DEFAULT_PROBE_TIMEOUT).unwrap(),
//!     plan,
//!     RecordingSleeper::new(),
//! );
//!
//! orchestrator.provision_topics().unwrap();
//! assert_eq!(orchestrator.state(), ProvisioningState::Ready);
//! assert_eq!(cluster.topic("twitter-topic").unwrap().partitions.len(), 3);
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod provisioning;
pub mod readiness;
pub mod retry;

pub use admin::{AdminApi, AdminApiError, AdminGateway, InMemoryCluster, TopicSpec};
pub use config::{AdminSettings, ConfigError};
pub use error::{ErrorKind, Phase, ProvisioningError};
pub use provisioning::{ProvisioningOrchestrator, ProvisioningPlan, ProvisioningState};
pub use readiness::{ProbeOutcome, ReadinessProber};
pub use retry::{CancellationToken, RetryBudget, Sleeper};

pub mod prelude {
    pub use crate::admin::{AdminApi, AdminApiError, AdminGateway, InMemoryCluster, TopicSpec};
    pub use crate::config::{AdminSettings, ConfigError};
    pub use crate::error::{ErrorKind, Phase, ProvisioningError};
    pub use crate::provisioning::{ProvisioningOrchestrator, ProvisioningPlan, ProvisioningState};
    pub use crate::readiness::{DEFAULT_PROBE_TIMEOUT, ProbeOutcome, ReadinessProber};
    pub use crate::retry::{CancellationToken, RecordingSleeper, RetryBudget, Sleeper};
}

#[cfg(test)]
mod tests;
