//! Broker admin API access: the one-shot primitives and the retrying gateway.

pub mod error;
pub mod gateway;
pub mod memory;
pub mod topic;

pub use error::AdminApiError;
pub use gateway::AdminGateway;
pub use memory::{InMemoryCluster, PartitionMetadata, TopicMetadata};
pub use topic::{ClusterTarget, TopicSpec};

use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of one create-topics request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTopicsAck {
    /// Topics the broker created for this request.
    pub created: Vec<String>,
    /// Topics the broker reported as already present without failing the request.
    pub already_present: Vec<String>,
}

impl CreateTopicsAck {
    pub fn len(&self) -> usize {
        self.created.len() + self.already_present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One-shot broker control-plane operations.
///
/// Implementations make a single request per call and never retry; retrying is
/// the job of [`AdminGateway`].
pub trait AdminApi {
    /// Issues one create-topics request covering every spec.
    fn create_topics(&self, topics: &[TopicSpec]) -> Result<CreateTopicsAck, AdminApiError>;

    /// Returns the topic names currently visible to the admin API.
    fn list_topics(&self) -> Result<BTreeSet<String>, AdminApiError>;
}

impl<A: AdminApi + ?Sized> AdminApi for &A {
    fn create_topics(&self, topics: &[TopicSpec]) -> Result<CreateTopicsAck, AdminApiError> {
        (**self).create_topics(topics)
    }

    fn list_topics(&self) -> Result<BTreeSet<String>, AdminApiError> {
        (**self).list_topics()
    }
}

impl<A: AdminApi + ?Sized> AdminApi for Arc<A> {
    fn create_topics(&self, topics: &[TopicSpec]) -> Result<CreateTopicsAck, AdminApiError> {
        (**self).create_topics(topics)
    }

    fn list_topics(&self) -> Result<BTreeSet<String>, AdminApiError> {
        (**self).list_topics()
    }
}

impl<A: AdminApi + ?Sized> AdminApi for Box<A> {
    fn create_topics(&self, topics: &[TopicSpec]) -> Result<CreateTopicsAck, AdminApiError> {
        (**self).create_topics(topics)
    }

    fn list_topics(&self) -> Result<BTreeSet<String>, AdminApiError> {
        (**self).list_topics()
    }
}
