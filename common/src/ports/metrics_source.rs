use async_trait::async_trait;

use crate::error::MetricsError;
use crate::inventory::SystemMetrics;

/// Supplies a CPU and memory sample of the scanning machine.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn sample(&self) -> Result<SystemMetrics, MetricsError>;
}
