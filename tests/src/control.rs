use std::sync::Arc;
use std::time::Duration;

use vigil_common::config::ScanConfig;
use vigil_core::coordinator::CycleOutcome;
use vigil_core::service::InventoryService;

use crate::fakes::{FakeMetrics, FakeProbe, lan_config};

fn service(probe: Arc<FakeProbe>, config: ScanConfig) -> InventoryService {
    InventoryService::with_collaborators(config, probe, Arc::new(FakeMetrics::healthy()))
}

#[tokio::test]
async fn stop_and_start_flip_only_the_flag() {
    let probe = Arc::new(FakeProbe::lan(2));
    let service = service(probe.clone(), lan_config());
    service.request_cycle().await;
    let before = service.snapshot();

    service.stop_scanning();
    let stopped = service.snapshot();
    assert!(!stopped.scanning);
    assert_eq!(stopped.devices, before.devices);
    assert_eq!(stopped.timestamp, before.timestamp);

    service.stop_scanning();
    assert!(!service.is_scanning());

    service.start_scanning();
    assert!(service.snapshot().scanning);
    assert_eq!(service.snapshot().devices, before.devices);
}

#[tokio::test]
async fn stopped_service_does_not_sweep() {
    let probe = Arc::new(FakeProbe::lan(2));
    let service = service(probe.clone(), lan_config());

    service.stop_scanning();
    let report = service.request_cycle().await;

    assert_eq!(report.outcome, CycleOutcome::Skipped);
    assert_eq!(probe.sweep_count.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(report.snapshot.is_never_scanned());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_during_cycle_lets_it_finish_and_reports_stopped() {
    let probe = Arc::new(FakeProbe::lan(2).with_sweep_delay(Duration::from_millis(200)));
    let service = service(probe, lan_config());

    let cycle = {
        let service = service.clone();
        tokio::spawn(async move { service.request_cycle().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    service.stop_scanning();

    let report = cycle.await.unwrap();

    assert_eq!(report.outcome, CycleOutcome::Published);
    assert_eq!(report.snapshot.devices.len(), 2);
    assert!(!report.snapshot.scanning);
    assert!(!service.snapshot().scanning);
}

#[tokio::test]
async fn timer_keeps_cycles_an_interval_apart() {
    let config = ScanConfig {
        interval: Duration::from_millis(50),
        ..lan_config()
    };
    let service = service(Arc::new(FakeProbe::lan(1)), config);
    let mut published = Vec::new();

    service
        .run_until(tokio::time::sleep(Duration::from_millis(400)), |report| {
            if report.outcome == CycleOutcome::Published {
                published.push(report.snapshot.timestamp);
            }
        })
        .await;

    assert!(published.len() >= 2, "only {} cycles ran", published.len());
    for pair in published.windows(2) {
        let (Some(a), Some(b)) = (pair[0], pair[1]) else {
            panic!("published snapshot without timestamp");
        };
        assert!(b - a >= chrono::Duration::milliseconds(50));
    }
}

#[tokio::test]
async fn paused_timer_runs_nothing_until_resumed() {
    let probe = Arc::new(FakeProbe::lan(1));
    let config = ScanConfig {
        interval: Duration::from_millis(20),
        start_enabled: false,
        ..lan_config()
    };
    let service = service(probe.clone(), config);
    let mut published = 0;

    let resume = {
        let service = service.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            assert_eq!(service.snapshot().timestamp, None);
            service.start_scanning();
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
    };
    service
        .run_until(resume, |report| {
            if report.outcome == CycleOutcome::Published {
                published += 1;
            }
        })
        .await;

    assert!(published >= 1);
    assert!(service.snapshot().scanning);
}
