//! Host metrics from the local machine via `sysinfo`.

use async_trait::async_trait;
use parking_lot::Mutex;
use sysinfo::{CpuExt, System, SystemExt};

use vigil_common::error::MetricsError;
use vigil_common::inventory::SystemMetrics;
use vigil_common::ports::metrics_source::MetricsSource;

/// Samples CPU and memory of the scanning machine.
///
/// The `System` handle is kept between samples: CPU usage is the delta
/// since the previous refresh, so the first sample may read 0%.
pub struct SysinfoMetrics {
    system: Mutex<System>,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    fn read(&self) -> Result<SystemMetrics, MetricsError> {
        let mut system = self.system.lock();
        system.refresh_cpu();
        system.refresh_memory();

        let memory_total = system.total_memory();
        if memory_total == 0 {
            return Err(MetricsError("memory totals not reported".into()));
        }

        Ok(SystemMetrics {
            cpu_usage: system.global_cpu_info().cpu_usage(),
            memory_total,
            memory_used: system.used_memory(),
            memory_free: system.free_memory(),
        })
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsSource for SysinfoMetrics {
    async fn sample(&self) -> Result<SystemMetrics, MetricsError> {
        self.read()
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
