//! # Host Discovery Stage
//!
//! Turns the configured subnet into the list of hosts that answered this
//! cycle's liveness sweep.
//!
//! The stage does not sweep anything itself: it resolves `auto` into the
//! local /24 and delegates the sweep to the [`ProbeClient`].

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, info};

use vigil_common::error::DiscoveryError;
use vigil_common::network::interface;
use vigil_common::network::subnet::{MAX_SWEEP_ADDRESSES, Subnet};
use vigil_common::network::target::Target;
use vigil_common::ports::probe_client::ProbeClient;

/// Source of this machine's LAN address.
pub type LocalAddressFn = fn() -> Option<Ipv4Addr>;

pub struct HostDiscovery {
    probe: Arc<dyn ProbeClient>,
    local_addr: LocalAddressFn,
}

impl HostDiscovery {
    pub fn new(probe: Arc<dyn ProbeClient>) -> Self {
        Self {
            probe,
            local_addr: interface::local_ipv4,
        }
    }

    /// Overrides how the local address is found. Used where the machine's
    /// real interfaces must not leak in.
    pub fn with_local_address(mut self, local_addr: LocalAddressFn) -> Self {
        self.local_addr = local_addr;
        self
    }

    /// Sweeps `subnet` and returns the live hosts, duplicates removed,
    /// in the order the sweep reported them.
    pub async fn discover(&self, subnet: &Subnet) -> Result<Vec<Target>, DiscoveryError> {
        let resolved = subnet
            .resolve(self.local_addr)
            .ok_or(DiscoveryError::NoLocalAddress)?;

        let size = resolved.len();
        if size > MAX_SWEEP_ADDRESSES {
            return Err(DiscoveryError::SubnetTooLarge {
                subnet: resolved.to_string(),
                size,
                limit: MAX_SWEEP_ADDRESSES,
            });
        }

        debug!(subnet = %resolved, addresses = size, "sweeping subnet");
        let swept = self.probe.sweep(&resolved).await?;

        let mut seen = HashSet::with_capacity(swept.len());
        let hosts: Vec<Target> = swept
            .into_iter()
            .filter(|target| seen.insert(target.clone()))
            .collect();

        info!(subnet = %resolved, hosts = hosts.len(), "sweep complete");
        Ok(hosts)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
