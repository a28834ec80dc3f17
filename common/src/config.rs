use std::time::Duration;

use crate::error::ConfigError;
use crate::network::subnet::{MAX_SWEEP_ADDRESSES, Subnet};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_HOSTS: usize = 100;
pub const DEFAULT_WORKERS: usize = 16;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(20);

/// Ports probed on every host unless configured otherwise.
pub const DEFAULT_PORTS: &[u16] = &[
    21,   // FTP
    22,   // SSH
    23,   // Telnet
    25,   // SMTP
    53,   // DNS
    80,   // HTTP
    110,  // POP3
    135,  // MS RPC
    139,  // NetBIOS
    143,  // IMAP
    443,  // HTTPS
    445,  // SMB
    548,  // AFP
    631,  // IPP
    993,  // IMAPS
    995,  // POP3S
    1883, // MQTT
    3306, // MySQL
    3389, // RDP
    5432, // PostgreSQL
    5900, // VNC
    8000, // HTTP-Alt
    8080, // HTTP-Proxy
    8443, // HTTPS-Alt
    9100, // JetDirect
];

/// Process-wide scan settings. Set once at startup and read-only afterwards;
/// only the scanning-enabled flag changes at runtime, and that lives in the
/// inventory cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Minimum time between completed cycles.
    pub interval: Duration,
    /// Ceiling on hosts probed in detail per cycle.
    pub max_hosts: usize,
    /// What discovery sweeps.
    pub subnet: Subnet,
    /// Concurrent per-host probes.
    pub workers: usize,
    /// Upper bound on one host's detail probe.
    pub probe_timeout: Duration,
    /// TCP ports probed on each host.
    pub ports: Vec<u16>,
    /// Initial state of the scanning-enabled flag.
    pub start_enabled: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_hosts: DEFAULT_MAX_HOSTS,
            subnet: Subnet::Auto,
            workers: DEFAULT_WORKERS,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            ports: DEFAULT_PORTS.to_vec(),
            start_enabled: true,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.max_hosts == 0 {
            return Err(ConfigError::ZeroMaxHosts);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.ports.is_empty() {
            return Err(ConfigError::NoPorts);
        }
        if self.ports.contains(&0) {
            return Err(ConfigError::InvalidPort);
        }
        let size = self.subnet.len();
        if size > MAX_SWEEP_ADDRESSES {
            return Err(ConfigError::SubnetTooLarge {
                subnet: self.subnet.to_string(),
                size,
                limit: MAX_SWEEP_ADDRESSES,
            });
        }
        Ok(())
    }

    /// Parses a subnet argument, mapping failures onto [`ConfigError`].
    pub fn parse_subnet(input: &str) -> Result<Subnet, ConfigError> {
        input
            .parse::<Subnet>()
            .map_err(|reason| ConfigError::InvalidSubnet {
                input: input.to_string(),
                reason,
            })
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
