//! TCP connect probing.
//!
//! A host is alive when any knocked port completes the handshake or answers
//! with a reset; both need a live stack on the other end. Silence and
//! timeouts say nothing. Needs no raw sockets, so it runs unprivileged.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use vigil_common::error::{DiscoveryError, NameError, ProbeError};
use vigil_common::inventory::{HostStatus, OsFact, PortFact, PortState};
use vigil_common::network::subnet::Subnet;
use vigil_common::network::target::Target;
use vigil_common::ports::probe_client::{ProbeClient, ProbeReport};

use crate::network::{banner, resolver};

/// Ports knocked during the liveness sweep, most likely answer first.
pub const SWEEP_PORTS: &[u16] = &[80, 443, 22, 445, 139, 3389];

const SWEEP_CONCURRENCY: usize = 256;
const PORT_CONCURRENCY: usize = 8;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(400);
const BANNER_TIMEOUT: Duration = Duration::from_millis(800);
const BANNER_LIMIT: usize = 512;

#[derive(Debug)]
enum Knock {
    Open(TcpStream),
    Closed,
    Silent,
    /// The local stack refused to even try.
    Fault(io::Error),
}

#[derive(Debug)]
enum Liveness {
    Alive,
    Silent,
    Fault(io::Error),
}

async fn knock(addr: SocketAddr, wait: Duration) -> Knock {
    match timeout(wait, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => Knock::Open(stream),
        Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Knock::Closed,
        Ok(Err(e)) if is_local_fault(&e) => Knock::Fault(e),
        Ok(Err(_)) | Err(_) => Knock::Silent,
    }
}

fn is_local_fault(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
    )
}

async fn grab_banner(stream: &mut TcpStream, port: u16) -> Option<String> {
    if banner::wants_http_request(port) {
        stream.write_all(banner::HTTP_REQUEST).await.ok()?;
    }
    let mut buf = vec![0u8; BANNER_LIMIT];
    let read = timeout(BANNER_TIMEOUT, stream.read(&mut buf)).await.ok()?.ok()?;
    if read == 0 {
        return None;
    }
    Some(String::from_utf8_lossy(&buf[..read]).into_owned())
}

#[derive(Debug)]
struct PortFinding {
    fact: PortFact,
    os: Option<OsFact>,
}

/// [`ProbeClient`] backed by plain TCP connects and the system resolver.
#[derive(Debug, Clone)]
pub struct TcpProbeClient {
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl TcpProbeClient {
    pub fn new(ports: Vec<u16>) -> Self {
        Self {
            ports,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    async fn liveness(&self, ip: IpAddr) -> Liveness {
        let mut fault = None;
        for &port in SWEEP_PORTS {
            match knock(SocketAddr::new(ip, port), self.connect_timeout).await {
                Knock::Open(_) | Knock::Closed => return Liveness::Alive,
                Knock::Fault(e) => fault = Some(e),
                Knock::Silent => {}
            }
        }
        fault.map_or(Liveness::Silent, Liveness::Fault)
    }

    async fn probe_port(&self, ip: IpAddr, port: u16) -> Option<PortFinding> {
        match knock(SocketAddr::new(ip, port), self.connect_timeout).await {
            Knock::Open(mut stream) => {
                let mut finding = PortFinding {
                    fact: PortFact::new(port, PortState::Open)
                        .with_service(banner::service_name(port)),
                    os: None,
                };
                if let Some(text) = grab_banner(&mut stream, port).await {
                    trace!(%ip, port, "banner: {}", text.trim());
                    let id = banner::identify(&text);
                    finding.os = id.os;
                    finding.fact = finding.fact.with_product(id.product, id.version);
                }
                Some(finding)
            }
            Knock::Closed => Some(PortFinding {
                fact: PortFact::new(port, PortState::Closed),
                os: None,
            }),
            Knock::Silent | Knock::Fault(_) => None,
        }
    }

    async fn address_of(&self, target: &Target) -> Result<IpAddr, ProbeError> {
        if let Some(ip) = target.addr() {
            return Ok(ip);
        }
        let failed = |reason: String| ProbeError::Failed {
            target: target.clone(),
            reason,
        };
        tokio::net::lookup_host((target.to_string(), 0))
            .await
            .map_err(|e| failed(e.to_string()))?
            .next()
            .map(|sock| sock.ip())
            .ok_or_else(|| failed("name has no addresses".into()))
    }
}

#[async_trait]
impl ProbeClient for TcpProbeClient {
    async fn sweep(&self, subnet: &Subnet) -> Result<Vec<Target>, DiscoveryError> {
        let addresses = subnet.addresses();
        let swept = addresses.len();

        let results: Vec<(IpAddr, Liveness)> = stream::iter(addresses)
            .map(|ip| async move { (ip, self.liveness(ip).await) })
            .buffered(SWEEP_CONCURRENCY)
            .collect()
            .await;

        let mut alive = Vec::new();
        let mut faults = 0usize;
        let mut last_fault = None;
        for (ip, liveness) in results {
            match liveness {
                Liveness::Alive => alive.push(Target::Addr(ip)),
                Liveness::Silent => {}
                Liveness::Fault(e) => {
                    faults += 1;
                    last_fault = Some(e);
                }
            }
        }

        if swept > 0 && faults == swept {
            let reason = last_fault.map_or_else(|| "unknown".into(), |e| e.to_string());
            return Err(DiscoveryError::Sweep {
                subnet: subnet.to_string(),
                reason,
            });
        }

        debug!(swept, alive = alive.len(), faults, "tcp sweep finished");
        Ok(alive)
    }

    async fn probe(&self, target: &Target) -> Result<ProbeReport, ProbeError> {
        let ip = self.address_of(target).await?;

        let findings: Vec<PortFinding> = stream::iter(self.ports.iter().copied())
            .map(|port| self.probe_port(ip, port))
            .buffered(PORT_CONCURRENCY)
            .filter_map(|finding| async move { finding })
            .collect()
            .await;

        // Not even a reset on any port.
        if findings.is_empty() {
            return Err(ProbeError::Unreachable {
                target: target.clone(),
            });
        }

        let mut candidates = Vec::new();
        let mut open = Vec::new();
        for finding in findings {
            if finding.fact.state != PortState::Open {
                continue;
            }
            candidates.extend(finding.os);
            open.push(finding.fact);
        }
        let open_numbers: Vec<u16> = open.iter().map(|fact| fact.port).collect();
        candidates.extend(banner::port_profile_hints(&open_numbers));

        Ok(ProbeReport {
            status: HostStatus::Up,
            os_candidates: candidates,
            ports: open,
        })
    }

    async fn resolve_name(&self, target: &Target) -> Result<String, NameError> {
        resolver::reverse_lookup(target).await
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
