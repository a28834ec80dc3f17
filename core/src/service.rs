//! # Inventory Service
//!
//! The single object the presentation layer (terminal, HTTP) holds on to.
//! Reads are served from the cache and never wait on a scan; the control
//! operations only flip the scanning-enabled flag.

use std::future::Future;
use std::sync::Arc;

use vigil_common::config::ScanConfig;
use vigil_common::inventory::InventorySnapshot;
use vigil_common::ports::metrics_source::MetricsSource;
use vigil_common::ports::probe_client::ProbeClient;

use crate::cache::InventoryCache;
use crate::coordinator::{CycleReport, ScanCoordinator};
use crate::network::tcp::TcpProbeClient;
use crate::system::SysinfoMetrics;

#[derive(Clone)]
pub struct InventoryService {
    coordinator: Arc<ScanCoordinator>,
}

impl InventoryService {
    pub fn new(coordinator: ScanCoordinator) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
        }
    }

    /// Wires the engine to the real network and this machine's metrics.
    pub fn from_config(config: ScanConfig) -> Self {
        let probe: Arc<dyn ProbeClient> = Arc::new(TcpProbeClient::new(config.ports.clone()));
        let metrics: Arc<dyn MetricsSource> = Arc::new(SysinfoMetrics::new());
        Self::with_collaborators(config, probe, metrics)
    }

    pub fn with_collaborators(
        config: ScanConfig,
        probe: Arc<dyn ProbeClient>,
        metrics: Arc<dyn MetricsSource>,
    ) -> Self {
        let cache = Arc::new(InventoryCache::new(config.start_enabled));
        Self::new(ScanCoordinator::new(
            Arc::new(config),
            probe,
            metrics,
            cache,
        ))
    }

    /// The current inventory.
    pub fn snapshot(&self) -> Arc<InventorySnapshot> {
        self.coordinator.cache().get()
    }

    pub fn start_scanning(&self) {
        self.coordinator.cache().set_enabled(true);
    }

    pub fn stop_scanning(&self) {
        self.coordinator.cache().set_enabled(false);
    }

    pub fn is_scanning(&self) -> bool {
        self.coordinator.cache().is_enabled()
    }

    /// Asks for a cycle now. Gated like a timer tick: the answer may be the
    /// cached snapshot if the interval has not elapsed or a cycle is running.
    pub async fn request_cycle(&self) -> CycleReport {
        self.coordinator.run_cycle().await
    }

    /// Runs the timer driver until `shutdown` resolves.
    pub async fn run_until<F, C>(&self, shutdown: F, on_cycle: C)
    where
        F: Future<Output = ()>,
        C: FnMut(&CycleReport),
    {
        self.coordinator.run_until(shutdown, on_cycle).await
    }

    pub fn coordinator(&self) -> &Arc<ScanCoordinator> {
        &self.coordinator
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
