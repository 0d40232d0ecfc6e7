//! Settings consumed by the provisioning run.
//!
//! The document mirrors the `kafka-config` / `retry-config` sections the
//! producer services already ship, with an optional `poll-retry-config` for a
//! separate polling budget.
//!
//! ```json
//! {
//!   "kafka-config": {
//!     "bootstrap-servers": "localhost:19092,localhost:29092",
//!     "schema-registry-url": "http://localhost:8081",
//!     "topic-names-to-create": ["twitter-topic"],
//!     "num-of-partitions": 3,
//!     "replication-factor": 3
//!   },
//!   "retry-config": {
//!     "initial-interval-ms": 1000,
//!     "max-interval-ms": 10000,
//!     "multiplier": 2.0,
//!     "max-attempts": 3,
//!     "sleep-time-ms": 2000
//!   }
//! }
//! ```

use crate::admin::{ClusterTarget, TopicSpec};
use crate::retry::RetryBudget;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KafkaConfigData {
    pub bootstrap_servers: String,
    pub schema_registry_url: String,
    pub topic_names_to_create: Vec<String>,
    pub num_of_partitions: u32,
    pub replication_factor: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfigData {
    pub max_attempts: u32,
    pub multiplier: f64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub sleep_time_ms: u64,
}

impl TryFrom<&RetryConfigData> for RetryBudget {
    type Error = ConfigError;

    fn try_from(data: &RetryConfigData) -> Result<Self, Self::Error> {
        RetryBudget::new(
            data.max_attempts,
            data.multiplier,
            data.initial_interval_ms,
            data.max_interval_ms,
            data.sleep_time_ms,
        )
    }
}

/// Root settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdminSettings {
    pub kafka_config: KafkaConfigData,
    pub retry_config: RetryConfigData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_retry_config: Option<RetryConfigData>,
}

impl AdminSettings {
    /// Parses and validates a JSON settings document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: AdminSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a JSON settings file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let kafka = &self.kafka_config;
        if kafka.bootstrap_servers.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "bootstrap-servers must not be empty".to_string(),
            ));
        }
        if kafka.topic_names_to_create.is_empty() {
            return Err(ConfigError::Invalid(
                "topic-names-to-create must list at least one topic".to_string(),
            ));
        }
        validate_registry_url(&kafka.schema_registry_url)?;
        self.topic_specs()?;
        self.admin_budget()?;
        self.poll_budget()?;
        Ok(())
    }

    /// Topic specs in configured order, names trimmed, duplicates kept.
    pub fn topic_specs(&self) -> Result<Vec<TopicSpec>, ConfigError> {
        let kafka = &self.kafka_config;
        TopicSpec::from_names(
            &kafka.topic_names_to_create,
            kafka.num_of_partitions,
            kafka.replication_factor,
        )
    }

    /// Budget of the admin API retry wrapper.
    pub fn admin_budget(&self) -> Result<RetryBudget, ConfigError> {
        RetryBudget::try_from(&self.retry_config)
    }

    /// Budget of the polling loops; falls back to `retry-config`.
    pub fn poll_budget(&self) -> Result<RetryBudget, ConfigError> {
        RetryBudget::try_from(self.poll_retry_config.as_ref().unwrap_or(&self.retry_config))
    }

    pub fn cluster_target(&self) -> ClusterTarget {
        ClusterTarget::new(self.kafka_config.bootstrap_servers.trim())
    }

    pub fn schema_registry_url(&self) -> &str {
        &self.kafka_config.schema_registry_url
    }
}

fn validate_registry_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|err| {
        ConfigError::Invalid(format!("schema-registry-url {:?} is not a valid URL: {}", raw, err))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid(format!(
            "schema-registry-url must use http or https, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const SETTINGS: &str = r#"{
        "kafka-config": {
            "bootstrap-servers": "  localhost:19092, localhost:29092 ",
            "schema-registry-url": "http://localhost:8081",
            "topic-names-to-create": [" twitter-topic ", "twitter-analytics-topic"],
            "num-of-partitions": 3,
            "replication-factor": 3
        },
        "retry-config": {
            "initial-interval-ms": 1000,
            "max-interval-ms": 10000,
            "multiplier": 2.0,
            "max-attempts": 3,
            "sleep-time-ms": 2000
        }
    }"#;

    fn settings() -> AdminSettings {
        AdminSettings::from_json_str(SETTINGS).unwrap()
    }

    #[test]
    fn test_parse_kebab_case_document() {
        let settings = settings();
        assert_eq!(settings.kafka_config.num_of_partitions, 3);
        assert_eq!(settings.retry_config.max_attempts, 3);
        assert_eq!(settings.schema_registry_url(), "http://localhost:8081");
        assert!(settings.poll_retry_config.is_none());
    }

    #[test]
    fn test_topic_specs_are_trimmed_and_ordered() {
        let specs = settings().topic_specs().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name(), "twitter-topic");
        assert_eq!(specs[1].name(), "twitter-analytics-topic");
        assert_eq!(specs[1].replication_factor(), 3);
    }

    #[test]
    fn test_poll_budget_falls_back_to_retry_config() {
        let settings = settings();
        assert_eq!(settings.poll_budget().unwrap(), settings.admin_budget().unwrap());
        assert_eq!(
            settings.poll_budget().unwrap().sleep_time(),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn test_separate_poll_budget() {
        let mut settings = settings();
        settings.poll_retry_config = Some(RetryConfigData {
            max_attempts: 10,
            multiplier: 3.0,
            initial_interval_ms: 0,
            max_interval_ms: 0,
            sleep_time_ms: 500,
        });
        settings.validate().unwrap();
        assert_eq!(settings.poll_budget().unwrap().max_attempts(), 10);
        assert_eq!(settings.admin_budget().unwrap().max_attempts(), 3);
    }

    #[test]
    fn test_cluster_target_is_trimmed() {
        assert_eq!(
            settings().cluster_target().bootstrap_addresses(),
            "localhost:19092, localhost:29092"
        );
    }

    #[test]
    fn test_blank_topic_name_rejected() {
        let json = SETTINGS.replace("\" twitter-topic \"", "\"   \"");
        assert!(matches!(
            AdminSettings::from_json_str(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_empty_topic_list_rejected() {
        let mut settings = settings();
        settings.kafka_config.topic_names_to_create.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let json = SETTINGS.replace("\"max-attempts\": 3", "\"max-attempts\": 0");
        assert!(matches!(
            AdminSettings::from_json_str(&json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_registry_url_rejected() {
        for url in ["localhost:8081/health", "ftp://registry", "not a url"] {
            let mut settings = settings();
            settings.kafka_config.schema_registry_url = url.to_string();
            assert!(settings.validate().is_err(), "{} should be rejected", url);
        }
    }

    #[test]
    fn test_blank_bootstrap_servers_rejected() {
        let mut settings = settings();
        settings.kafka_config.bootstrap_servers = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = AdminSettings::from_json_str(r#"{"kafka-config": {}}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SETTINGS.as_bytes()).unwrap();
        let settings = AdminSettings::from_file(file.path()).unwrap();
        assert_eq!(settings, self::settings());
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AdminSettings::from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_round_trip_through_serde() {
        let settings = settings();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"topic-names-to-create\""));
        assert!(!json.contains("poll-retry-config"));
    }
}
