//! Health probing of HTTP dependencies such as the schema registry.

pub mod transport;

pub use transport::{DEFAULT_PROBE_TIMEOUT, HttpTransport, ReqwestTransport, TransportError};

use log::{debug, warn};
use std::fmt;
use std::time::Duration;

/// Classified result of one health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unavailable,
}

impl ProbeOutcome {
    /// Maps an HTTP status code: 2xx is healthy, anything else is not.
    ///
    /// # Examples
    ///
    /// ```
    /// use kafka_admin::readiness::ProbeOutcome;
    ///
    /// assert_eq!(ProbeOutcome::from_status(204), ProbeOutcome::Healthy);
    /// assert_eq!(ProbeOutcome::from_status(503), ProbeOutcome::Unavailable);
    /// ```
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            ProbeOutcome::Healthy
        } else {
            ProbeOutcome::Unavailable
        }
    }

    pub fn is_healthy(self) -> bool {
        self == ProbeOutcome::Healthy
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Healthy => write!(f, "healthy"),
            ProbeOutcome::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Issues health probes and folds every failure mode into [`ProbeOutcome`].
pub struct ReadinessProber<T = ReqwestTransport> {
    transport: T,
}

impl ReadinessProber<ReqwestTransport> {
    /// Creates a prober backed by a blocking reqwest client.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Ok(ReadinessProber::new(ReqwestTransport::new(timeout)?))
    }
}

impl<T: HttpTransport> ReadinessProber<T> {
    pub fn new(transport: T) -> Self {
        ReadinessProber { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issues one GET to `url`. Never fails: non-2xx statuses and transport
    /// errors both come back as [`ProbeOutcome::Unavailable`].
    pub fn probe(&self, url: &str) -> ProbeOutcome {
        match self.transport.get_status(url) {
            Ok(status) => {
                let outcome = ProbeOutcome::from_status(status);
                debug!("Probe of {} returned status {} ({})", url, status, outcome);
                outcome
            }
            Err(err) => {
                warn!("Probe of {} failed: {}", url, err);
                ProbeOutcome::Unavailable
            }
        }
    }
}
