use crate::error::Phase;
use std::fmt;

/// Observable state of a [`ProvisioningOrchestrator`](super::ProvisioningOrchestrator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    NotStarted,
    TopicsCreated,
    RegistryReady,
    Ready,
    Failed(Phase),
}

impl ProvisioningState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisioningState::Ready | ProvisioningState::Failed(_))
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningState::NotStarted => write!(f, "not started"),
            ProvisioningState::TopicsCreated => write!(f, "topics created"),
            ProvisioningState::RegistryReady => write!(f, "registry ready"),
            ProvisioningState::Ready => write!(f, "ready"),
            ProvisioningState::Failed(phase) => write!(f, "failed while {}", phase),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TopicProgress {
    #[default]
    Pending,
    Created,
    Verified,
    Failed(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RegistryProgress {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Progress of the two independent startup sequences.
///
/// Topic provisioning and registry polling advance separately; the combined
/// [`ProvisioningState`] is derived from both. A failure in either sequence
/// wins over any success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Progress {
    topics: TopicProgress,
    registry: RegistryProgress,
}

impl Progress {
    pub(crate) fn restart_topics(&mut self) {
        self.topics = TopicProgress::Pending;
    }

    pub(crate) fn topics_created(&mut self) {
        self.topics = TopicProgress::Created;
    }

    pub(crate) fn topics_verified(&mut self) {
        self.topics = TopicProgress::Verified;
    }

    pub(crate) fn topics_failed(&mut self, phase: Phase) {
        self.topics = TopicProgress::Failed(phase);
    }

    pub(crate) fn restart_registry(&mut self) {
        self.registry = RegistryProgress::Pending;
    }

    pub(crate) fn registry_ready(&mut self) {
        self.registry = RegistryProgress::Ready;
    }

    pub(crate) fn registry_failed(&mut self) {
        self.registry = RegistryProgress::Failed;
    }

    pub(crate) fn is_fully_ready(&self) -> bool {
        self.topics == TopicProgress::Verified && self.registry == RegistryProgress::Ready
    }

    pub(crate) fn state(&self) -> ProvisioningState {
        if let TopicProgress::Failed(phase) = self.topics {
            return ProvisioningState::Failed(phase);
        }
        if self.registry == RegistryProgress::Failed {
            return ProvisioningState::Failed(Phase::RegistryProbe);
        }
        match self.topics {
            TopicProgress::Verified => ProvisioningState::Ready,
            TopicProgress::Created => ProvisioningState::TopicsCreated,
            _ if self.registry == RegistryProgress::Ready => ProvisioningState::RegistryReady,
            _ => ProvisioningState::NotStarted,
        }
    }
}
