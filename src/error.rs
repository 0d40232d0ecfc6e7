use crate::retry::{PollInterrupt, RetryError};
use std::fmt;
use thiserror::Error;

/// Step of the provisioning run an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Create,
    List,
    RegistryProbe,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Create => write!(f, "creating kafka topic(s)"),
            Phase::List => write!(f, "reading kafka topic(s)"),
            Phase::RegistryProbe => write!(f, "checking schema registry"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MaxRetriesExceeded,
    Cancelled,
    NonRetryable,
}

/// Terminal failure of a provisioning or readiness operation.
///
/// Individual admin and transport failures never surface here; they are
/// absorbed as failed attempts and only the aggregate outcome is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisioningError {
    #[error("Reached max number of retry for {phase}! ({attempts} attempt(s))")]
    MaxRetriesExceeded { phase: Phase, attempts: u32 },
    #[error("Cancelled while {phase} after {attempts} attempt(s)")]
    Cancelled { phase: Phase, attempts: u32 },
    #[error("Giving up on {phase} after attempt {attempts}: {reason}")]
    NonRetryable {
        phase: Phase,
        attempts: u32,
        reason: String,
    },
}

impl ProvisioningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisioningError::MaxRetriesExceeded { .. } => ErrorKind::MaxRetriesExceeded,
            ProvisioningError::Cancelled { .. } => ErrorKind::Cancelled,
            ProvisioningError::NonRetryable { .. } => ErrorKind::NonRetryable,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ProvisioningError::MaxRetriesExceeded { phase, .. }
            | ProvisioningError::Cancelled { phase, .. }
            | ProvisioningError::NonRetryable { phase, .. } => *phase,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ProvisioningError::MaxRetriesExceeded { attempts, .. }
            | ProvisioningError::Cancelled { attempts, .. }
            | ProvisioningError::NonRetryable { attempts, .. } => *attempts,
        }
    }

    pub(crate) fn from_retry<E: fmt::Display>(phase: Phase, error: RetryError<E>) -> Self {
        match error {
            RetryError::Exhausted { attempts, .. } => {
                ProvisioningError::MaxRetriesExceeded { phase, attempts }
            }
            RetryError::Cancelled { attempts } => ProvisioningError::Cancelled { phase, attempts },
            RetryError::NonRetryable { attempts, error } => ProvisioningError::NonRetryable {
                phase,
                attempts,
                reason: error.to_string(),
            },
        }
    }

    pub(crate) fn from_poll(phase: Phase, interrupt: PollInterrupt) -> Self {
        match interrupt {
            PollInterrupt::Exhausted { attempts } => {
                ProvisioningError::MaxRetriesExceeded { phase, attempts }
            }
            PollInterrupt::Cancelled { attempts } => {
                ProvisioningError::Cancelled { phase, attempts }
            }
        }
    }
}
