//! Failure taxonomy.
//!
//! Only [`ConfigError`] ever reaches the user; every other error is contained
//! by the stage that produced it (see the coordinator in `vigil-core`).

use std::time::Duration;

use thiserror::Error;

use crate::network::target::Target;

/// The subnet sweep could not be carried out. The cycle is abandoned and the
/// previous snapshot stays current.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("could not determine the local network address")]
    NoLocalAddress,

    #[error("subnet {subnet} spans {size} addresses, more than the limit of {limit}")]
    SubnetTooLarge { subnet: String, size: u64, limit: u64 },

    #[error("sweep of {subnet} failed: {reason}")]
    Sweep { subnet: String, reason: String },
}

/// A single host could not be probed. The host is left out of the cycle's
/// results; the cycle carries on.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe of {target} timed out after {timeout:?}")]
    Timeout { target: Target, timeout: Duration },

    #[error("{target} did not answer on any probed port")]
    Unreachable { target: Target },

    #[error("probe of {target} failed: {reason}")]
    Failed { target: Target, reason: String },
}

impl ProbeError {
    pub fn target(&self) -> &Target {
        match self {
            ProbeError::Timeout { target, .. }
            | ProbeError::Unreachable { target }
            | ProbeError::Failed { target, .. } => target,
        }
    }
}

/// Reverse name resolution failed. Non-fatal: the host is named "Unknown".
#[derive(Debug, Error)]
#[error("no name found for {target}: {reason}")]
pub struct NameError {
    pub target: Target,
    pub reason: String,
}

/// System metrics were unavailable. Non-fatal: zeros are substituted.
#[derive(Debug, Error)]
#[error("system metrics unavailable: {0}")]
pub struct MetricsError(pub String);

/// The scan configuration is unusable. Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("scan interval must be greater than zero")]
    ZeroInterval,

    #[error("maximum hosts per cycle must be greater than zero")]
    ZeroMaxHosts,

    #[error("worker pool size must be greater than zero")]
    ZeroWorkers,

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("at least one port must be probed")]
    NoPorts,

    #[error("port 0 cannot be probed")]
    InvalidPort,

    #[error("invalid subnet '{input}': {reason}")]
    InvalidSubnet { input: String, reason: String },

    #[error("subnet {subnet} is too large to sweep ({size} addresses, limit {limit})")]
    SubnetTooLarge { subnet: String, size: u64, limit: u64 },
}
