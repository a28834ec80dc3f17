//! # Detail Scan Stage
//!
//! Fans per-host probes out over a fixed-size worker pool.
//!
//! Each host is probed in isolation. Its liveness/port/OS probe and its
//! reverse lookup run side by side, each under its own deadline. A host
//! whose probe fails or overruns the deadline is dropped from the results
//! and the remaining hosts carry on. A lookup that fails or stalls only
//! costs the host its name.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::time::timeout;
use tracing::{debug, warn};

use vigil_common::error::ProbeError;
use vigil_common::inventory::{HostRecord, OsFact, UNKNOWN};
use vigil_common::network::target::Target;
use vigil_common::ports::probe_client::ProbeClient;

/// Upper bound on one reverse lookup, never longer than the host deadline.
const NAME_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one detail scan: records for hosts that probed cleanly, and
/// the failures for those that did not.
#[derive(Debug, Default)]
pub struct DetailScan {
    pub records: Vec<HostRecord>,
    pub failures: Vec<ProbeError>,
}

pub struct DetailScanner {
    probe: Arc<dyn ProbeClient>,
    workers: usize,
    host_timeout: Duration,
}

impl DetailScanner {
    pub fn new(probe: Arc<dyn ProbeClient>, workers: usize, host_timeout: Duration) -> Self {
        Self {
            probe,
            workers: workers.max(1),
            host_timeout,
        }
    }

    /// Probes at most `max_hosts` of `targets`, taken from the front in
    /// discovery order. Records come back in that same order.
    pub async fn detail_scan(&self, targets: Vec<Target>, max_hosts: usize) -> DetailScan {
        if targets.len() > max_hosts {
            debug!(
                discovered = targets.len(),
                max_hosts, "truncating detail scan to host ceiling"
            );
        }

        let outcomes: Vec<Result<HostRecord, ProbeError>> =
            stream::iter(targets.into_iter().take(max_hosts))
                .map(|target| self.scan_host(target))
                .buffered(self.workers)
                .collect()
                .await;

        let mut scan = DetailScan::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => scan.records.push(record),
                Err(e) => {
                    warn!(target = %e.target(), "host excluded from cycle: {e}");
                    scan.failures.push(e);
                }
            }
        }
        scan
    }

    async fn scan_host(&self, target: Target) -> Result<HostRecord, ProbeError> {
        let name_timeout = self.host_timeout.min(NAME_LOOKUP_TIMEOUT);
        let (report, name) = tokio::join!(
            timeout(self.host_timeout, self.probe.probe(&target)),
            timeout(name_timeout, self.probe.resolve_name(&target))
        );

        let Ok(report) = report else {
            return Err(ProbeError::Timeout {
                target,
                timeout: self.host_timeout,
            });
        };
        let report = report?;

        let hostname = match name {
            Ok(Ok(name)) => name,
            Ok(Err(e)) => {
                debug!("{e}");
                UNKNOWN.to_string()
            }
            Err(_elapsed) => {
                debug!(%target, "reverse lookup timed out after {name_timeout:?}");
                UNKNOWN.to_string()
            }
        };

        Ok(HostRecord::new(
            target,
            hostname,
            report.status,
            OsFact::best(report.os_candidates),
            report.ports,
            Utc::now(),
        ))
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
