//! # Inventory Models
//!
//! The facts a cycle gathers and the immutable snapshot they are published in.
//!
//! Serialization maps straight onto the JSON served to consumers:
//! `devices` (with `ip`, `hostname`, `os`, `ports`, `status`, `last_seen`),
//! `metrics`, `timestamp` and `scanning`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::network::target::Target;

/// Name used whenever a fact could not be determined.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

/// One probed transport port of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortFact {
    pub port: u16,
    pub state: PortState,
    pub service: String,
    pub product: String,
    pub version: String,
}

impl PortFact {
    pub fn new(port: u16, state: PortState) -> Self {
        Self {
            port,
            state,
            service: String::new(),
            product: String::new(),
            version: String::new(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>, version: impl Into<String>) -> Self {
        self.product = product.into();
        self.version = version.into();
        self
    }
}

/// An operating system guess and how confident the prober is in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsFact {
    pub name: String,
    /// 0 to 100.
    pub accuracy: u8,
    pub family: String,
}

impl OsFact {
    pub fn new(name: impl Into<String>, accuracy: u8, family: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accuracy: accuracy.min(100),
            family: family.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, 0, UNKNOWN)
    }

    /// Highest accuracy wins; among equals the earliest candidate is kept.
    /// No candidates at all yields [`OsFact::unknown`].
    pub fn best(candidates: impl IntoIterator<Item = OsFact>) -> OsFact {
        candidates
            .into_iter()
            .fold(None::<OsFact>, |best, candidate| match best {
                Some(current) if current.accuracy >= candidate.accuracy => Some(current),
                _ => Some(candidate),
            })
            .unwrap_or_else(OsFact::unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Up,
    Down,
    Unknown,
}

/// Everything learned about one host during one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    #[serde(rename = "ip")]
    pub target: Target,
    pub hostname: String,
    pub status: HostStatus,
    pub os: OsFact,
    pub ports: Vec<PortFact>,
    pub last_seen: DateTime<Utc>,
}

impl HostRecord {
    /// Builds a record, dropping any repeated port number (first report wins).
    pub fn new(
        target: Target,
        hostname: String,
        status: HostStatus,
        os: OsFact,
        ports: Vec<PortFact>,
        last_seen: DateTime<Utc>,
    ) -> Self {
        let mut seen = std::collections::HashSet::new();
        let ports = ports
            .into_iter()
            .filter(|fact| seen.insert(fact.port))
            .collect();

        Self {
            target,
            hostname,
            status,
            os,
            ports,
            last_seen,
        }
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortFact> {
        self.ports.iter().filter(|p| p.state == PortState::Open)
    }
}

/// CPU and memory of the scanning machine at capture time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemMetrics {
    pub cpu_usage: f32,
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_free: u64,
}

/// A point-in-time inventory. Never patched: a new cycle publishes a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySnapshot {
    pub devices: Vec<HostRecord>,
    pub metrics: SystemMetrics,
    /// `None` until the first cycle completes.
    pub timestamp: Option<DateTime<Utc>>,
    pub scanning: bool,
}

impl InventorySnapshot {
    /// The "never scanned" snapshot served before the first cycle completes.
    pub fn empty(scanning: bool) -> Self {
        Self {
            devices: Vec::new(),
            metrics: SystemMetrics::default(),
            timestamp: None,
            scanning,
        }
    }

    pub fn captured(
        devices: Vec<HostRecord>,
        metrics: SystemMetrics,
        timestamp: DateTime<Utc>,
        scanning: bool,
    ) -> Self {
        Self {
            devices,
            metrics,
            timestamp: Some(timestamp),
            scanning,
        }
    }

    pub fn is_never_scanned(&self) -> bool {
        self.timestamp.is_none()
    }

    pub fn device(&self, target: &Target) -> Option<&HostRecord> {
        self.devices.iter().find(|d| &d.target == target)
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
