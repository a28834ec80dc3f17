use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use vigil_common::config::ScanConfig;
use vigil_common::network::range::Ipv4Range;
use vigil_common::network::subnet::Subnet;
use vigil_common::network::target::Target;
use vigil_common::ports::probe_client::ProbeClient;
use vigil_core::coordinator::CycleOutcome;
use vigil_core::discovery::HostDiscovery;
use vigil_core::network::tcp::TcpProbeClient;
use vigil_core::service::InventoryService;

use crate::fakes::FakeMetrics;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn loopback_client(ports: Vec<u16>) -> Arc<TcpProbeClient> {
    Arc::new(TcpProbeClient::new(ports).with_connect_timeout(Duration::from_millis(500)))
}

/// The sweep counts a refused connection as a live host, so loopback
/// answers even with nothing listening.
#[tokio::test]
async fn discovery_single_loopback() {
    let discovery = HostDiscovery::new(loopback_client(vec![80]));

    let result = discovery.discover(&Subnet::Single { addr: LOCALHOST }).await;

    assert!(result.is_ok(), "Discovery failed: {:?}", result.err());
    let hosts = result.unwrap();
    assert_eq!(
        hosts,
        vec![Target::Addr(LOCALHOST)],
        "Found hosts do not match localhost"
    );
}

#[tokio::test]
#[cfg(target_os = "linux")]
async fn discovery_range_loopback() {
    let range = Ipv4Range::new(Ipv4Addr::new(127, 0, 0, 1), Ipv4Addr::new(127, 0, 0, 3));
    let discovery = HostDiscovery::new(loopback_client(vec![80]));

    let result = discovery.discover(&Subnet::Range { ipv4_range: range }).await;

    assert!(result.is_ok(), "Discovery failed: {:?}", result.err());
    let hosts = result.unwrap();
    assert!(
        hosts.len() == 3,
        "Found incorrect amount of hosts: {}",
        hosts.len()
    );
}

#[tokio::test]
async fn full_cycle_against_loopback_service() {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = socket.write_all(b"SSH-2.0-OpenSSH_9.6p1 Ubuntu-3ubuntu13\r\n").await;
        }
    });

    let config = ScanConfig {
        subnet: Subnet::Single { addr: LOCALHOST },
        ports: vec![port],
        probe_timeout: Duration::from_secs(5),
        ..ScanConfig::default()
    };
    let probe: Arc<dyn ProbeClient> = loopback_client(config.ports.clone());
    let service =
        InventoryService::with_collaborators(config, probe, Arc::new(FakeMetrics::healthy()));

    let report = service.request_cycle().await;

    assert_eq!(report.outcome, CycleOutcome::Published);
    let device = report
        .snapshot
        .device(&Target::Addr(LOCALHOST))
        .expect("localhost missing from inventory");
    assert_eq!(device.ports.len(), 1);
    assert_eq!(device.ports[0].port, port);
    assert_eq!(device.ports[0].product, "OpenSSH");
    assert!(!device.hostname.is_empty());
    assert!(device.os.name.contains("Ubuntu") || device.os.family == "Linux");
}
