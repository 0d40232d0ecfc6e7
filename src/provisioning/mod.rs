//! Startup gate: topic provisioning, topic verification and registry polling.

pub mod state;

pub use state::ProvisioningState;

use crate::admin::{AdminApi, AdminApiError, AdminGateway, TopicSpec};
use crate::config::{AdminSettings, ConfigError};
use crate::error::{Phase, ProvisioningError};
use crate::readiness::{HttpTransport, ReadinessProber, ReqwestTransport};
use crate::retry::{PollingRetry, RetryAll, RetryBudget, RetryClassifier, Sleeper};
use log::{debug, error, info};
use state::Progress;

/// What a provisioning run works towards.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningPlan {
    /// Topics to create and verify, in verification order.
    pub topics: Vec<TopicSpec>,
    pub registry_url: String,
    /// Budget of the topic-existence and registry polling loops.
    pub poll_budget: RetryBudget,
}

impl ProvisioningPlan {
    pub fn from_settings(settings: &AdminSettings) -> Result<Self, ConfigError> {
        Ok(ProvisioningPlan {
            topics: settings.topic_specs()?,
            registry_url: settings.schema_registry_url().to_string(),
            poll_budget: settings.poll_budget()?,
        })
    }
}

/// Sequences topic creation, topic verification and registry polling.
///
/// Every operation blocks the calling thread, including the delays between
/// attempts. Cancelling the sleeper aborts the running loop with
/// [`ProvisioningError::Cancelled`].
pub struct ProvisioningOrchestrator<A, T = ReqwestTransport, C = RetryAll> {
    gateway: AdminGateway<A, C>,
    prober: ReadinessProber<T>,
    plan: ProvisioningPlan,
    sleeper: Box<dyn Sleeper + Send>,
    progress: Progress,
}

impl<A: AdminApi, T: HttpTransport> ProvisioningOrchestrator<A, T> {
    /// Wires an orchestrator from validated settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::InMemoryCluster;
    /// use kafka_admin::config::AdminSettings;
    /// use kafka_admin::provisioning::{ProvisioningOrchestrator, ProvisioningState};
    /// use kafka_admin::readiness::ReqwestTransport;
    /// use kafka_admin::retry::RecordingSleeper;
    /// use std::time::Duration;
    ///
    /// let settings = AdminSettings::from_json_str(r#"{
    ///     "kafka-config": {
    ///         "bootstrap-servers": "localhost:19092",
    ///         "schema-registry-url": "http://localhost:8081",
    ///         "topic-names-to-create": ["twitter-topic"],
    ///         "num-of-partitions": 3,
    ///         "replication-factor": 1
    ///     },
    ///     "retry-config": {
    ///         "initial-interval-ms": 100, "max-interval-ms": 1000, "multiplier": 2.0,
    ///         "max-attempts": 3, "sleep-time-ms": 100
    ///     }
    /// }"#).unwrap();
    ///
    /// let mut orchestrator = ProvisioningOrchestrator::from_settings(
    ///     &settings,
    ///     InMemoryCluster::new(1),
    ///     ReqwestTransport::new(Duration::from_secs(1)).unwrap(),
    ///     RecordingSleeper::new(),
    /// ).unwrap();
    ///
    /// orchestrator.provision_topics().unwrap();
    /// assert_eq!(orchestrator.state(), ProvisioningState::Ready);
    /// ```
    pub fn from_settings(
        settings: &AdminSettings,
        api: A,
        transport: T,
        sleeper: impl Sleeper + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let gateway = AdminGateway::new(api, &settings.admin_budget()?);
        let prober = ReadinessProber::new(transport);
        let plan = ProvisioningPlan::from_settings(settings)?;
        Ok(ProvisioningOrchestrator::new(gateway, prober, plan, sleeper))
    }
}

impl<A, T, C> ProvisioningOrchestrator<A, T, C>
where
    A: AdminApi,
    T: HttpTransport,
    C: RetryClassifier<AdminApiError>,
{
    pub fn new(
        gateway: AdminGateway<A, C>,
        prober: ReadinessProber<T>,
        plan: ProvisioningPlan,
        sleeper: impl Sleeper + Send + 'static,
    ) -> Self {
        ProvisioningOrchestrator {
            gateway,
            prober,
            plan,
            sleeper: Box::new(sleeper),
            progress: Progress::default(),
        }
    }

    pub fn state(&self) -> ProvisioningState {
        self.progress.state()
    }

    /// True once topics are verified and the registry has answered healthy.
    pub fn is_fully_ready(&self) -> bool {
        self.progress.is_fully_ready()
    }

    pub fn topics(&self) -> &[TopicSpec] {
        &self.plan.topics
    }

    pub fn plan(&self) -> &ProvisioningPlan {
        &self.plan
    }

    pub fn gateway(&self) -> &AdminGateway<A, C> {
        &self.gateway
    }

    pub fn prober(&self) -> &ReadinessProber<T> {
        &self.prober
    }

    /// Creates every planned topic in one batch, then verifies them.
    pub fn provision_topics(&mut self) -> Result<(), ProvisioningError> {
        self.progress.restart_topics();
        match self.gateway.create_topics(&self.plan.topics, &*self.sleeper) {
            Ok(ack) => {
                info!(
                    "Create request accepted: {} created, {} already present",
                    ack.created.len(),
                    ack.already_present.len()
                );
                self.progress.topics_created();
            }
            Err(err) => {
                self.progress.topics_failed(err.phase());
                return Err(err);
            }
        }
        self.verify_all()
    }

    /// Waits until every planned topic is visible to the admin API.
    ///
    /// Topics are checked in plan order and share one polling budget. Running
    /// out of it on any topic is fatal and later topics are not checked.
    pub fn verify_all(&mut self) -> Result<(), ProvisioningError> {
        let result = self.check_topics_created();
        match &result {
            Ok(()) => self.progress.topics_verified(),
            Err(err) => self.progress.topics_failed(err.phase()),
        }
        result
    }

    /// Polls the schema registry until it answers with a 2xx status.
    pub fn await_registry_ready(&mut self) -> Result<(), ProvisioningError> {
        self.progress.restart_registry();
        let url = self.plan.registry_url.as_str();
        let prober = &self.prober;
        let result = PollingRetry::new(&self.plan.poll_budget)
            .poll_until(&*self.sleeper, |attempt| {
                let outcome = prober.probe(url);
                debug!("Schema registry probe {} is {}", attempt, outcome);
                outcome.is_healthy()
            });

        match result {
            Ok(probes) => {
                info!("Schema registry at {} is healthy after {} probe(s)", url, probes);
                self.progress.registry_ready();
                Ok(())
            }
            Err(interrupt) => {
                let err = ProvisioningError::from_poll(Phase::RegistryProbe, interrupt);
                error!("Schema registry at {} never became healthy: {}", url, err);
                self.progress.registry_failed();
                Err(err)
            }
        }
    }

    /// Full startup gate: provision topics, then wait for the registry.
    pub fn initialize(&mut self) -> Result<(), ProvisioningError> {
        self.provision_topics()?;
        self.await_registry_ready()?;
        let names: Vec<&str> = self.plan.topics.iter().map(TopicSpec::name).collect();
        info!("Topics with name {:?} is ready for operations!", names);
        Ok(())
    }

    fn check_topics_created(&self) -> Result<(), ProvisioningError> {
        let sleeper = &*self.sleeper;
        let mut poll = PollingRetry::new(&self.plan.poll_budget);
        let mut visible = self.gateway.list_topics(sleeper)?;

        for topic in &self.plan.topics {
            while !visible.contains(topic.name()) {
                if let Err(interrupt) = poll.backoff_after_failure(sleeper) {
                    let err = ProvisioningError::from_poll(Phase::List, interrupt);
                    error!("Topic {} is still not visible: {}", topic.name(), err);
                    return Err(err);
                }
                visible = self.gateway.list_topics(sleeper)?;
            }
            debug!("Topic {} is visible (check {})", topic.name(), poll.attempt());
        }
        Ok(())
    }
}
