//! # Scan Coordinator
//!
//! Runs one full cycle (discovery, detail scan, metrics sample, publish)
//! and drives cycles from a timer.
//!
//! A coordinator is `Idle` or `Running`. A single guard admits one cycle at a
//! time; a request arriving while a cycle runs is answered with the current
//! snapshot instead of waiting. No failure inside a cycle escapes it:
//! readers always get a valid, possibly stale, snapshot.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, info_span, warn};

use vigil_common::config::ScanConfig;
use vigil_common::inventory::{InventorySnapshot, SystemMetrics};
use vigil_common::ports::metrics_source::MetricsSource;
use vigil_common::ports::probe_client::ProbeClient;

use crate::cache::InventoryCache;
use crate::detail::DetailScanner;
use crate::discovery::HostDiscovery;

/// How often the timer driver consults the scheduler.
const TICK_RESOLUTION: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was published.
    Published,
    /// The scheduler declined: scanning disabled or interval not elapsed.
    Skipped,
    /// Another cycle held the guard.
    Busy,
    /// Discovery failed; the previous snapshot stays current.
    DiscoveryFailed,
}

/// What a cycle request was answered with.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub snapshot: Arc<InventorySnapshot>,
    /// Hosts dropped because their detail probe failed or timed out.
    pub failed_hosts: usize,
    pub elapsed: Duration,
}

pub struct ScanCoordinator {
    config: Arc<ScanConfig>,
    discovery: HostDiscovery,
    detail: DetailScanner,
    metrics: Arc<dyn MetricsSource>,
    cache: Arc<InventoryCache>,
    running: Mutex<()>,
    cycle_ids: AtomicU64,
    /// Consecutive cycles whose discovery failed.
    discovery_failures: AtomicU32,
}

impl ScanCoordinator {
    pub fn new(
        config: Arc<ScanConfig>,
        probe: Arc<dyn ProbeClient>,
        metrics: Arc<dyn MetricsSource>,
        cache: Arc<InventoryCache>,
    ) -> Self {
        let discovery = HostDiscovery::new(Arc::clone(&probe));
        let detail = DetailScanner::new(probe, config.workers, config.probe_timeout);
        Self {
            config,
            discovery,
            detail,
            metrics,
            cache,
            running: Mutex::new(()),
            cycle_ids: AtomicU64::new(0),
            discovery_failures: AtomicU32::new(0),
        }
    }

    /// Swaps in a custom discovery stage (e.g. with a fixed local address).
    pub fn with_discovery(mut self, discovery: HostDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn cache(&self) -> &Arc<InventoryCache> {
        &self.cache
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Requests one cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = Instant::now();

        let Ok(_guard) = self.running.try_lock() else {
            debug!("cycle already running, serving current snapshot");
            return self.report(CycleOutcome::Busy, 0, started);
        };

        if !self.cache.should_run(Utc::now(), self.config.interval) {
            return self.report(CycleOutcome::Skipped, 0, started);
        }

        let id = self.cycle_ids.fetch_add(1, Ordering::Relaxed) + 1;
        let span = info_span!("cycle", id);
        self.execute(started).instrument(span).await
    }

    async fn execute(&self, started: Instant) -> CycleReport {
        info!(subnet = %self.config.subnet, "scan cycle started");

        let targets = match self.discovery.discover(&self.config.subnet).await {
            Ok(targets) => {
                let failed = self.discovery_failures.swap(0, Ordering::Relaxed);
                if failed > 0 {
                    info!(failed_cycles = failed, "host discovery recovered");
                }
                targets
            }
            Err(e) => {
                // The timer retries every tick; only the first failure is loud.
                let streak = self.discovery_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if streak == 1 {
                    error!("host discovery failed, keeping previous inventory: {e}");
                } else {
                    debug!(streak, "host discovery still failing: {e}");
                }
                return self.report(CycleOutcome::DiscoveryFailed, 0, started);
            }
        };

        let scan = self
            .detail
            .detail_scan(targets, self.config.max_hosts)
            .await;

        let metrics = self.metrics.sample().await.unwrap_or_else(|e| {
            warn!("{e}");
            SystemMetrics::default()
        });

        let snapshot = InventorySnapshot::captured(
            scan.records,
            metrics,
            Utc::now(),
            self.cache.is_enabled(),
        );
        let published = self.cache.publish(snapshot);

        info!(
            devices = published.devices.len(),
            failed = scan.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan cycle complete"
        );

        CycleReport {
            outcome: CycleOutcome::Published,
            snapshot: published,
            failed_hosts: scan.failures.len(),
            elapsed: started.elapsed(),
        }
    }

    /// Runs cycles on a timer until `shutdown` resolves.
    ///
    /// The timer fires every second at most and the scheduler decides
    /// whether a cycle actually starts, so the interval is measured from
    /// the last completed cycle. `on_cycle` sees every published snapshot.
    pub async fn run_until<F, C>(&self, shutdown: F, mut on_cycle: C)
    where
        F: Future<Output = ()>,
        C: FnMut(&CycleReport),
    {
        let mut ticker = tokio::time::interval(TICK_RESOLUTION.min(self.config.interval));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            interval_s = self.config.interval.as_secs_f64(),
            "scan timer started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if report.outcome != CycleOutcome::Skipped {
                        on_cycle(&report);
                    }
                }
            }
        }

        info!("scan timer stopped");
    }

    fn report(&self, outcome: CycleOutcome, failed_hosts: usize, started: Instant) -> CycleReport {
        CycleReport {
            outcome,
            snapshot: self.cache.get(),
            failed_hosts,
            elapsed: started.elapsed(),
        }
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
