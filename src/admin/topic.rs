use crate::config::ConfigError;
use std::fmt;

/// Topic requested from the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    name: String,
    partitions: u32,
    replication_factor: u16,
}

impl TopicSpec {
    /// Creates a new topic spec.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the topic; surrounding whitespace is removed.
    /// * `partitions` - The number of partitions for the topic.
    /// * `replication_factor` - The replication factor for the topic.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::TopicSpec;
    ///
    /// let topic = TopicSpec::new(" twitter-topic ", 3, 2).unwrap();
    /// assert_eq!(topic.name(), "twitter-topic");
    /// assert_eq!(topic.partitions(), 3);
    /// assert_eq!(topic.replication_factor(), 2);
    /// ```
    pub fn new(name: &str, partitions: u32, replication_factor: u16) -> Result<Self, ConfigError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid(
                "topic name must not be empty".to_string(),
            ));
        }
        if partitions == 0 {
            return Err(ConfigError::Invalid(format!(
                "topic {} needs at least one partition",
                name
            )));
        }
        if replication_factor == 0 {
            return Err(ConfigError::Invalid(format!(
                "topic {} needs a replication factor of at least 1",
                name
            )));
        }
        Ok(TopicSpec {
            name: name.to_string(),
            partitions,
            replication_factor,
        })
    }

    /// Builds one spec per name with cluster-wide partition and replication
    /// settings. Order and duplicates are kept as given.
    pub fn from_names<I, S>(
        names: I,
        partitions: u32,
        replication_factor: u16,
    ) -> Result<Vec<Self>, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| TopicSpec::new(name.as_ref(), partitions, replication_factor))
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partitions(&self) -> u32 {
        self.partitions
    }

    pub fn replication_factor(&self) -> u16 {
        self.replication_factor
    }
}

impl fmt::Display for TopicSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (partitions: {}, replication: {})",
            self.name, self.partitions, self.replication_factor
        )
    }
}

/// Connection descriptor handed to the admin API as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTarget {
    bootstrap_addresses: String,
}

impl ClusterTarget {
    pub fn new(bootstrap_addresses: impl Into<String>) -> Self {
        ClusterTarget {
            bootstrap_addresses: bootstrap_addresses.into(),
        }
    }

    pub fn bootstrap_addresses(&self) -> &str {
        &self.bootstrap_addresses
    }
}

impl fmt::Display for ClusterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bootstrap_addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_spec_creation() {
        let topic = TopicSpec::new("test_topic", 3, 2).unwrap();
        assert_eq!(topic.name(), "test_topic");
        assert_eq!(topic.partitions(), 3);
        assert_eq!(topic.replication_factor(), 2);
    }

    #[test]
    fn test_topic_name_is_trimmed() {
        let topic = TopicSpec::new("\t tweets \n", 1, 1).unwrap();
        assert_eq!(topic.name(), "tweets");
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(matches!(
            TopicSpec::new("   ", 1, 1),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_partitions_or_replication_rejected() {
        assert!(TopicSpec::new("a", 0, 1).is_err());
        assert!(TopicSpec::new("a", 1, 0).is_err());
    }

    #[test]
    fn test_from_names_keeps_order_and_duplicates() {
        let specs = TopicSpec::from_names(["b", " a", "b "], 3, 1).unwrap();
        let names: Vec<&str> = specs.iter().map(TopicSpec::name).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
        assert!(specs.iter().all(|spec| spec.partitions() == 3));
    }

    #[test]
    fn test_from_names_fails_on_any_blank_name() {
        assert!(TopicSpec::from_names(["ok", ""], 1, 1).is_err());
    }

    #[test]
    fn test_display() {
        let topic = TopicSpec::new("tweets", 3, 2).unwrap();
        assert_eq!(
            topic.to_string(),
            "tweets (partitions: 3, replication: 2)"
        );
        assert_eq!(ClusterTarget::new("localhost:19092").to_string(), "localhost:19092");
    }
}
