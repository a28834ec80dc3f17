use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use vigil_common::config::ScanConfig;
use vigil_common::inventory::{HostStatus, OsFact, PortFact, PortState, SystemMetrics};
use vigil_common::network::subnet::Subnet;
use vigil_common::ports::probe_client::ProbeReport;
use vigil_core::cache::InventoryCache;
use vigil_core::coordinator::{CycleOutcome, ScanCoordinator};
use vigil_core::discovery::HostDiscovery;

use crate::fakes::{FakeMetrics, FakeProbe, HostScript, engine, host, lan_config};

#[tokio::test]
async fn reads_before_first_cycle_are_never_scanned() {
    let coordinator = engine(
        Arc::new(FakeProbe::lan(3)),
        FakeMetrics::healthy(),
        lan_config(),
    );

    let snapshot = coordinator.cache().get();

    assert!(snapshot.devices.is_empty());
    assert!(snapshot.timestamp.is_none());
    assert_eq!(snapshot.metrics, SystemMetrics::default());
}

#[tokio::test]
async fn failing_host_is_left_out_and_others_recorded() {
    let g = host(1);
    let h = host(2);
    let probe = FakeProbe::lan(0)
        .with_hosts(vec![g.clone(), h.clone()])
        .with_script(h, HostScript::Fail);
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), lan_config());

    let report = coordinator.run_cycle().await;

    assert_eq!(report.outcome, CycleOutcome::Published);
    assert_eq!(report.failed_hosts, 1);
    let devices = &coordinator.cache().get().devices;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].target, g);
}

#[tokio::test]
async fn only_max_hosts_are_probed() {
    let probe = Arc::new(FakeProbe::lan(3));
    let config = ScanConfig {
        max_hosts: 2,
        ..lan_config()
    };
    let coordinator = engine(probe.clone(), FakeMetrics::healthy(), config);

    coordinator.run_cycle().await;

    assert_eq!(probe.probed_sorted(), vec![host(1), host(2)]);
    assert_eq!(coordinator.cache().get().devices.len(), 2);
}

#[tokio::test]
async fn most_accurate_os_guess_is_recorded() {
    let report = ProbeReport::up()
        .with_os_candidates(vec![
            OsFact::new("Linux 4.x", 80, "Linux"),
            OsFact::new("Linux 5.x", 95, "Linux"),
        ])
        .with_ports(vec![
            PortFact::new(22, PortState::Open)
                .with_service("ssh")
                .with_product("OpenSSH", "9.6p1"),
        ]);
    let probe = FakeProbe::lan(1).with_script(host(1), HostScript::Report(report));
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), lan_config());

    coordinator.run_cycle().await;

    let snapshot = coordinator.cache().get();
    let device = snapshot.device(&host(1)).unwrap();
    assert_eq!(device.os, OsFact::new("Linux 5.x", 95, "Linux"));
    assert_eq!(device.status, HostStatus::Up);
    assert_eq!(device.ports[0].product, "OpenSSH");
}

#[tokio::test]
async fn unresolvable_host_is_named_unknown() {
    let probe = FakeProbe::lan(2).without_name(host(2));
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), lan_config());

    coordinator.run_cycle().await;

    let snapshot = coordinator.cache().get();
    assert_eq!(snapshot.device(&host(1)).unwrap().hostname, "host-192.168.1.1.lan");
    assert_eq!(snapshot.device(&host(2)).unwrap().hostname, "Unknown");
}

#[tokio::test]
async fn stalled_name_lookup_keeps_probed_host() {
    let probe = FakeProbe::lan(2).with_stalled_name(host(1));
    let config = ScanConfig {
        probe_timeout: Duration::from_millis(100),
        ..lan_config()
    };
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), config);

    let report = coordinator.run_cycle().await;

    assert_eq!(report.failed_hosts, 0);
    assert_eq!(report.snapshot.devices.len(), 2);
    assert_eq!(report.snapshot.device(&host(1)).unwrap().hostname, "Unknown");
    assert_eq!(report.snapshot.device(&host(2)).unwrap().hostname, "host-192.168.1.2.lan");
}

#[tokio::test]
async fn hung_host_costs_one_timeout_not_the_cycle() {
    let probe = FakeProbe::lan(3).with_script(host(2), HostScript::Hang);
    let config = ScanConfig {
        probe_timeout: Duration::from_millis(100),
        ..lan_config()
    };
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), config);

    let report = coordinator.run_cycle().await;

    assert_eq!(report.outcome, CycleOutcome::Published);
    assert_eq!(report.failed_hosts, 1);
    assert_eq!(report.snapshot.devices.len(), 2);
    assert!(report.snapshot.device(&host(2)).is_none());
}

#[tokio::test]
async fn discovery_failure_keeps_previous_snapshot() {
    let probe = Arc::new(FakeProbe::lan(2));
    let config = ScanConfig {
        interval: Duration::from_millis(50),
        ..lan_config()
    };
    let coordinator = engine(probe.clone(), FakeMetrics::healthy(), config);

    let first = coordinator.run_cycle().await;
    assert_eq!(first.outcome, CycleOutcome::Published);

    probe.set_sweep_failing(true);
    tokio::time::sleep(Duration::from_millis(80)).await;
    let second = coordinator.run_cycle().await;

    assert_eq!(second.outcome, CycleOutcome::DiscoveryFailed);
    assert!(Arc::ptr_eq(&second.snapshot, &first.snapshot));
    assert!(Arc::ptr_eq(&coordinator.cache().get(), &first.snapshot));
    assert_eq!(coordinator.cache().last_completed_at(), first.snapshot.timestamp);
}

#[tokio::test]
async fn metrics_outage_publishes_zeros() {
    let coordinator = engine(
        Arc::new(FakeProbe::lan(1)),
        FakeMetrics::failing(),
        lan_config(),
    );

    let report = coordinator.run_cycle().await;

    assert_eq!(report.outcome, CycleOutcome::Published);
    assert_eq!(report.snapshot.devices.len(), 1);
    assert_eq!(report.snapshot.metrics, SystemMetrics::default());
}

#[tokio::test]
async fn healthy_metrics_are_carried() {
    let coordinator = engine(
        Arc::new(FakeProbe::lan(1)),
        FakeMetrics::healthy(),
        lan_config(),
    );

    let report = coordinator.run_cycle().await;

    assert_eq!(report.snapshot.metrics.cpu_usage, 7.5);
    assert!(report.snapshot.metrics.memory_total > 0);
}

#[tokio::test]
async fn interval_gates_repeat_requests() {
    let probe = Arc::new(FakeProbe::lan(1));
    let config = ScanConfig {
        interval: Duration::from_millis(100),
        ..lan_config()
    };
    let coordinator = engine(probe.clone(), FakeMetrics::healthy(), config);

    assert_eq!(coordinator.run_cycle().await.outcome, CycleOutcome::Published);
    assert_eq!(coordinator.run_cycle().await.outcome, CycleOutcome::Skipped);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(coordinator.run_cycle().await.outcome, CycleOutcome::Published);
    assert_eq!(probe.sweep_count.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn auto_subnet_sweeps_local_24() {
    let probe = Arc::new(FakeProbe::lan(1));
    let config = ScanConfig {
        subnet: Subnet::Auto,
        ..ScanConfig::default()
    };
    let coordinator = ScanCoordinator::new(
        Arc::new(config),
        probe.clone(),
        Arc::new(FakeMetrics::healthy()),
        Arc::new(InventoryCache::default()),
    )
    .with_discovery(
        HostDiscovery::new(probe.clone())
            .with_local_address(|| Some(Ipv4Addr::new(192, 168, 1, 57))),
    );

    coordinator.run_cycle().await;

    assert_eq!(
        probe.swept.lock().as_slice(),
        &[Subnet::Block {
            network: Ipv4Addr::new(192, 168, 1, 0),
            prefix: 24
        }]
    );
}

#[tokio::test]
async fn snapshot_serializes_to_the_api_shape() {
    let probe = FakeProbe::lan(1).with_script(
        host(1),
        HostScript::Report(
            ProbeReport::up().with_ports(vec![PortFact::new(80, PortState::Open).with_service("http")]),
        ),
    );
    let coordinator = engine(Arc::new(probe), FakeMetrics::healthy(), lan_config());

    let report = coordinator.run_cycle().await;
    let json = serde_json::to_value(&*report.snapshot).unwrap();

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["devices", "metrics", "scanning", "timestamp"]);

    let device = &json["devices"][0];
    assert_eq!(device["ip"], "192.168.1.1");
    assert_eq!(device["status"], "up");
    assert_eq!(device["ports"][0]["state"], "open");
    assert_eq!(device["ports"][0]["service"], "http");
    assert!(device["last_seen"].is_string());
    assert_eq!(json["scanning"], true);
}
