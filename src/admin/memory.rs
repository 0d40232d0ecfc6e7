use crate::admin::{AdminApi, AdminApiError, ClusterTarget, CreateTopicsAck, TopicSpec};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};
use std::sync::{Mutex, MutexGuard, PoisonError};

const MAX_TOPIC_NAME_LEN: usize = 249;

/// Metadata of a topic held by [`InMemoryCluster`].
#[derive(Clone, PartialEq, Eq)]
pub struct TopicMetadata {
    pub name: String,
    pub partitions: Vec<PartitionMetadata>,
}

impl Debug for TopicMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicMetadata")
            .field("name", &self.name)
            .field("partitions", &self.partitions.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionMetadata {
    pub id: u32,
    pub leader: u32,
    pub replicas: Vec<u32>,
}

impl TopicMetadata {
    /// Lays out partitions round-robin over `broker_count` brokers.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::{TopicMetadata, TopicSpec};
    ///
    /// let spec = TopicSpec::new("test_topic", 3, 2).unwrap();
    /// let topic = TopicMetadata::assign(&spec, 3);
    /// assert_eq!(topic.partitions.len(), 3);
    /// assert_eq!(topic.partitions[1].replicas, vec![1, 2]);
    /// ```
    pub fn assign(spec: &TopicSpec, broker_count: u32) -> Self {
        let replication = u32::from(spec.replication_factor());
        let partitions = (0..spec.partitions())
            .map(|id| {
                let replicas: Vec<u32> = (0..replication)
                    .map(|offset| (id + offset) % broker_count)
                    .collect();
                PartitionMetadata {
                    id,
                    leader: replicas[0],
                    replicas,
                }
            })
            .collect();

        TopicMetadata {
            name: spec.name().to_string(),
            partitions,
        }
    }

    pub fn replication_factor(&self) -> usize {
        self.partitions
            .first()
            .map(|partition| partition.replicas.len())
            .unwrap_or(0)
    }
}

/// In-process admin API with fault injection.
///
/// Models the metadata side of a cluster only: topics, their partition layout,
/// and how quickly a new topic becomes visible to listing. Failures can be
/// scheduled to exercise retry paths without a running broker.
pub struct InMemoryCluster {
    target: ClusterTarget,
    broker_count: u32,
    state: Mutex<ClusterState>,
}

#[derive(Default)]
struct ClusterState {
    topics: BTreeMap<String, StoredTopic>,
    create_failures: u32,
    list_failures: u32,
    visibility_lag: u32,
    reject_existing: bool,
    create_calls: u32,
    list_calls: u32,
}

struct StoredTopic {
    metadata: TopicMetadata,
    hidden_for: u32,
}

impl InMemoryCluster {
    /// Creates an empty cluster of `broker_count` brokers (at least one).
    pub fn new(broker_count: u32) -> Self {
        Self::for_target(&ClusterTarget::new("in-memory"), broker_count)
    }

    /// Creates an empty cluster standing in for the cluster at `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::{ClusterTarget, InMemoryCluster};
    ///
    /// let target = ClusterTarget::new("localhost:19092,localhost:29092");
    /// let cluster = InMemoryCluster::for_target(&target, 2);
    /// assert_eq!(cluster.target(), &target);
    /// assert_eq!(cluster.broker_count(), 2);
    /// ```
    pub fn for_target(target: &ClusterTarget, broker_count: u32) -> Self {
        let broker_count = broker_count.max(1);
        debug!("Simulating cluster {} with {} broker(s)", target, broker_count);
        InMemoryCluster {
            target: target.clone(),
            broker_count,
            state: Mutex::new(ClusterState::default()),
        }
    }

    pub fn target(&self) -> &ClusterTarget {
        &self.target
    }

    pub fn broker_count(&self) -> u32 {
        self.broker_count
    }

    /// Makes the next `count` create requests fail with `BrokerNotAvailable`.
    pub fn fail_next_creates(&self, count: u32) {
        self.state().create_failures = count;
    }

    /// Makes the next `count` list requests fail with `BrokerNotAvailable`.
    pub fn fail_next_lists(&self, count: u32) {
        self.state().list_failures = count;
    }

    /// Hides newly created topics from the next `lag` list requests.
    pub fn set_visibility_lag(&self, lag: u32) {
        self.state().visibility_lag = lag;
    }

    /// Rejects a whole request when it names an existing topic.
    pub fn set_reject_existing(&self, reject: bool) {
        self.state().reject_existing = reject;
    }

    pub fn create_calls(&self) -> u32 {
        self.state().create_calls
    }

    pub fn list_calls(&self) -> u32 {
        self.state().list_calls
    }

    pub fn topic(&self, name: &str) -> Option<TopicMetadata> {
        self.state()
            .topics
            .get(name)
            .map(|stored| stored.metadata.clone())
    }

    pub fn topic_count(&self) -> usize {
        self.state().topics.len()
    }

    fn state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate(&self, spec: &TopicSpec) -> Result<(), AdminApiError> {
        let name = spec.name();
        if name.len() > MAX_TOPIC_NAME_LEN {
            return Err(AdminApiError::InvalidTopic(format!(
                "{} is longer than {} characters",
                name, MAX_TOPIC_NAME_LEN
            )));
        }
        if name == "." || name == ".." {
            return Err(AdminApiError::InvalidTopic(format!(
                "{} is not a legal topic name",
                name
            )));
        }
        if let Some(illegal) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(AdminApiError::InvalidTopic(format!(
                "{} contains illegal character {:?}",
                name, illegal
            )));
        }
        if u32::from(spec.replication_factor()) > self.broker_count {
            return Err(AdminApiError::InvalidReplicationFactor(format!(
                "{} exceeds the {} available broker(s) for topic {}",
                spec.replication_factor(),
                self.broker_count,
                name
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryCluster {
    fn default() -> Self {
        Self::new(1)
    }
}

impl AdminApi for InMemoryCluster {
    fn create_topics(&self, topics: &[TopicSpec]) -> Result<CreateTopicsAck, AdminApiError> {
        let mut state = self.state();
        state.create_calls += 1;

        if state.create_failures > 0 {
            state.create_failures -= 1;
            return Err(AdminApiError::BrokerNotAvailable(
                "controller is not ready".to_string(),
            ));
        }
        for spec in topics {
            self.validate(spec)?;
            if state.reject_existing && state.topics.contains_key(spec.name()) {
                return Err(AdminApiError::TopicAlreadyExists(spec.name().to_string()));
            }
        }

        let mut ack = CreateTopicsAck::default();
        let hidden_for = state.visibility_lag;
        for spec in topics {
            if state.topics.contains_key(spec.name()) {
                ack.already_present.push(spec.name().to_string());
                continue;
            }
            let metadata = TopicMetadata::assign(spec, self.broker_count);
            debug!("Created topic {:?}", metadata);
            state.topics.insert(
                spec.name().to_string(),
                StoredTopic {
                    metadata,
                    hidden_for,
                },
            );
            ack.created.push(spec.name().to_string());
        }
        Ok(ack)
    }

    fn list_topics(&self) -> Result<BTreeSet<String>, AdminApiError> {
        let mut state = self.state();
        state.list_calls += 1;

        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(AdminApiError::BrokerNotAvailable(
                "metadata request failed".to_string(),
            ));
        }

        let mut visible = BTreeSet::new();
        for (name, stored) in state.topics.iter_mut() {
            if stored.hidden_for > 0 {
                stored.hidden_for -= 1;
            } else {
                visible.insert(name.clone());
            }
        }
        Ok(visible)
    }
}
