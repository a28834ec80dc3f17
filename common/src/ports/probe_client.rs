use async_trait::async_trait;

use crate::error::{DiscoveryError, NameError, ProbeError};
use crate::inventory::{HostStatus, OsFact, PortFact};
use crate::network::subnet::Subnet;
use crate::network::target::Target;

/// What a detail probe learned about one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: HostStatus,
    /// Every OS guess, in the order the prober produced them.
    pub os_candidates: Vec<OsFact>,
    pub ports: Vec<PortFact>,
}

impl ProbeReport {
    pub fn up() -> Self {
        Self {
            status: HostStatus::Up,
            os_candidates: Vec::new(),
            ports: Vec::new(),
        }
    }

    pub fn with_ports(mut self, ports: Vec<PortFact>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_os_candidates(mut self, candidates: Vec<OsFact>) -> Self {
        self.os_candidates = candidates;
        self
    }
}

/// The probing capability: liveness sweeps, detail probes and reverse lookups.
///
/// Implementations own their packet-level semantics and their own
/// concurrency limits; callers only decide when and how often to ask.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    /// Returns the live hosts of an already-resolved `subnet`, in sweep order.
    /// A sweep that completes but finds nobody returns an empty list.
    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<Target>, DiscoveryError>;

    /// Probes one host for liveness, ports, services and OS guesses.
    async fn probe(&self, target: &Target) -> Result<ProbeReport, ProbeError>;

    /// Best-effort reverse name resolution.
    async fn resolve_name(&self, target: &Target) -> Result<String, NameError>;
}
