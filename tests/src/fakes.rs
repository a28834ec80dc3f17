//! Scripted stand-ins for the probing and metrics collaborators.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use vigil_common::config::ScanConfig;
use vigil_common::error::{DiscoveryError, MetricsError, NameError, ProbeError};
use vigil_common::inventory::SystemMetrics;
use vigil_common::network::subnet::Subnet;
use vigil_common::network::target::Target;
use vigil_common::ports::metrics_source::MetricsSource;
use vigil_common::ports::probe_client::{ProbeClient, ProbeReport};
use vigil_core::cache::InventoryCache;
use vigil_core::coordinator::ScanCoordinator;

pub fn host(last: u8) -> Target {
    Target::Addr(IpAddr::V4(Ipv4Addr::new(192, 168, 1, last)))
}

#[derive(Clone)]
pub enum HostScript {
    Report(ProbeReport),
    Fail,
    Hang,
}

/// Counts how many callers are inside a section at once, and the most ever.
#[derive(Default)]
pub struct Gauge {
    now: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.now.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeProbe {
    hosts: Vec<Target>,
    scripts: HashMap<Target, HostScript>,
    unnamed: HashSet<Target>,
    stalled_names: HashSet<Target>,
    sweep_delay: Duration,
    probe_delay: Duration,
    fail_sweep: AtomicBool,

    pub swept: Mutex<Vec<Subnet>>,
    pub probed: Mutex<Vec<Target>>,
    pub sweeps: Gauge,
    pub probes: Gauge,
    pub sweep_count: AtomicUsize,
}

impl FakeProbe {
    /// A LAN whose sweep finds `192.168.1.1` to `192.168.1.n`.
    pub fn lan(n: u8) -> Self {
        Self {
            hosts: (1..=n).map(host).collect(),
            ..Self::default()
        }
    }

    pub fn with_hosts(mut self, hosts: Vec<Target>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn with_script(mut self, target: Target, script: HostScript) -> Self {
        self.scripts.insert(target, script);
        self
    }

    pub fn without_name(mut self, target: Target) -> Self {
        self.unnamed.insert(target);
        self
    }

    /// Reverse lookups of `target` never return.
    pub fn with_stalled_name(mut self, target: Target) -> Self {
        self.stalled_names.insert(target);
        self
    }

    pub fn with_sweep_delay(mut self, delay: Duration) -> Self {
        self.sweep_delay = delay;
        self
    }

    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    pub fn set_sweep_failing(&self, failing: bool) {
        self.fail_sweep.store(failing, Ordering::SeqCst);
    }

    pub fn probed_sorted(&self) -> Vec<Target> {
        let mut probed = self.probed.lock().clone();
        probed.sort();
        probed
    }
}

#[async_trait]
impl ProbeClient for FakeProbe {
    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<Target>, DiscoveryError> {
        self.sweeps.enter();
        self.sweep_count.fetch_add(1, Ordering::SeqCst);
        self.swept.lock().push(subnet.clone());
        tokio::time::sleep(self.sweep_delay).await;
        self.sweeps.leave();

        if self.fail_sweep.load(Ordering::SeqCst) {
            return Err(DiscoveryError::Sweep {
                subnet: subnet.to_string(),
                reason: "scripted outage".into(),
            });
        }
        Ok(self.hosts.clone())
    }

    async fn probe(&self, target: &Target) -> Result<ProbeReport, ProbeError> {
        self.probed.lock().push(target.clone());
        self.probes.enter();
        tokio::time::sleep(self.probe_delay).await;
        self.probes.leave();

        match self.scripts.get(target).cloned() {
            None => Ok(ProbeReport::up()),
            Some(HostScript::Report(report)) => Ok(report),
            Some(HostScript::Fail) => Err(ProbeError::Failed {
                target: target.clone(),
                reason: "scripted failure".into(),
            }),
            Some(HostScript::Hang) => std::future::pending().await,
        }
    }

    async fn resolve_name(&self, target: &Target) -> Result<String, NameError> {
        if self.stalled_names.contains(target) {
            return std::future::pending().await;
        }
        if self.unnamed.contains(target) {
            return Err(NameError {
                target: target.clone(),
                reason: "NXDOMAIN".into(),
            });
        }
        Ok(format!("host-{target}.lan"))
    }
}

pub struct FakeMetrics {
    sample: Option<SystemMetrics>,
}

impl FakeMetrics {
    pub fn healthy() -> Self {
        Self {
            sample: Some(SystemMetrics {
                cpu_usage: 7.5,
                memory_total: 16 << 30,
                memory_used: 6 << 30,
                memory_free: 10 << 30,
            }),
        }
    }

    pub fn failing() -> Self {
        Self { sample: None }
    }
}

#[async_trait]
impl MetricsSource for FakeMetrics {
    async fn sample(&self) -> Result<SystemMetrics, MetricsError> {
        self.sample
            .ok_or_else(|| MetricsError("scripted metrics outage".into()))
    }
}

pub fn lan_config() -> ScanConfig {
    ScanConfig {
        subnet: "192.168.1.0/24".parse().unwrap(),
        ..ScanConfig::default()
    }
}

pub fn engine(
    probe: Arc<FakeProbe>,
    metrics: FakeMetrics,
    config: ScanConfig,
) -> Arc<ScanCoordinator> {
    let cache = Arc::new(InventoryCache::new(config.start_enabled));
    Arc::new(ScanCoordinator::new(
        Arc::new(config),
        probe,
        Arc::new(metrics),
        cache,
    ))
}
