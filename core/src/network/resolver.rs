use std::net::IpAddr;

use tokio::sync::Semaphore;

use vigil_common::error::NameError;
use vigil_common::network::target::Target;

/// Most reverse lookups allowed on the blocking pool at once.
pub const MAX_CONCURRENT_LOOKUPS: usize = 16;

/// `lookup_addr` cannot be cancelled. A caller that gives up on a lookup
/// leaves the blocking task running until the system resolver returns, and
/// the task keeps its permit until then, so stuck lookups never hold more
/// than [`MAX_CONCURRENT_LOOKUPS`] blocking threads.
static LOOKUP_SLOTS: Semaphore = Semaphore::const_new(MAX_CONCURRENT_LOOKUPS);

/// Reverse-resolves a target through the system resolver.
///
/// Named targets already carry their name. A lookup that only echoes the
/// address back counts as a failure.
pub async fn reverse_lookup(target: &Target) -> Result<String, NameError> {
    let ip: IpAddr = match target {
        Target::Name(name) => return Ok(name.clone()),
        Target::Addr(ip) => *ip,
    };

    let failed = |reason: String| NameError {
        target: target.clone(),
        reason,
    };

    let permit = LOOKUP_SLOTS
        .acquire()
        .await
        .map_err(|e| failed(e.to_string()))?;

    let name = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        dns_lookup::lookup_addr(&ip)
    })
    .await
    .map_err(|e| failed(e.to_string()))?
    .map_err(|e| failed(e.to_string()))?;

    let name = name.trim_end_matches('.');
    if name.is_empty() || name == ip.to_string() {
        return Err(failed("no PTR record".into()));
    }
    Ok(name.to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
