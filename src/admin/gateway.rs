use crate::admin::{AdminApi, AdminApiError, CreateTopicsAck, TopicSpec};
use crate::error::{Phase, ProvisioningError};
use crate::retry::{RetryAll, RetryBudget, RetryClassifier, RetryTemplate, Sleeper};
use log::{error, info};
use std::collections::BTreeSet;

/// Admin API wrapped in the bounded exponential retry.
pub struct AdminGateway<A, C = RetryAll> {
    api: A,
    template: RetryTemplate<C>,
}

impl<A: AdminApi> AdminGateway<A> {
    /// Creates a gateway that retries every admin failure within `budget`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::admin::{AdminGateway, InMemoryCluster, TopicSpec};
    /// use kafka_admin::retry::{RecordingSleeper, RetryBudget};
    ///
    /// let budget = RetryBudget::new(3, 2.0, 100, 1000, 100).unwrap();
    /// let gateway = AdminGateway::new(InMemoryCluster::new(3), &budget);
    /// let sleeper = RecordingSleeper::new();
    ///
    /// let specs = TopicSpec::from_names(["tweets"], 3, 2).unwrap();
    /// gateway.create_topics(&specs, &sleeper).unwrap();
    /// assert!(gateway.list_topics(&sleeper).unwrap().contains("tweets"));
    /// ```
    pub fn new(api: A, budget: &RetryBudget) -> Self {
        AdminGateway {
            api,
            template: RetryTemplate::new(budget),
        }
    }
}

impl<A: AdminApi, C: RetryClassifier<AdminApiError>> AdminGateway<A, C> {
    /// Swaps the failure classifier, e.g. to fail fast on invalid topics.
    pub fn with_classifier<D: RetryClassifier<AdminApiError>>(
        self,
        classifier: D,
    ) -> AdminGateway<A, D> {
        AdminGateway {
            api: self.api,
            template: self.template.with_classifier(classifier),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates every topic in one request per attempt.
    ///
    /// Topics that already exist are not treated specially: if the API rejects
    /// them, the rejection is one more failed attempt.
    pub fn create_topics<S: Sleeper + ?Sized>(
        &self,
        topics: &[TopicSpec],
        sleeper: &S,
    ) -> Result<CreateTopicsAck, ProvisioningError> {
        self.template
            .execute(sleeper, |ctx| {
                info!("Creating {} topic(s), attempt {}", topics.len(), ctx.attempt);
                self.api.create_topics(topics)
            })
            .map_err(|err| {
                let err = ProvisioningError::from_retry(Phase::Create, err);
                error!("{}", err);
                err
            })
    }

    /// Lists the topics visible to the admin API.
    pub fn list_topics<S: Sleeper + ?Sized>(
        &self,
        sleeper: &S,
    ) -> Result<BTreeSet<String>, ProvisioningError> {
        self.template
            .execute(sleeper, |_| self.api.list_topics())
            .map_err(|err| {
                let err = ProvisioningError::from_retry(Phase::List, err);
                error!("{}", err);
                err
            })
    }
}
