use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use vigil_common::config::ScanConfig;
use vigil_core::coordinator::CycleOutcome;

use crate::fakes::{FakeMetrics, FakeProbe, engine, lan_config};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_requests_run_one_cycle() {
    let probe = Arc::new(FakeProbe::lan(4).with_sweep_delay(Duration::from_millis(200)));
    let coordinator = engine(probe.clone(), FakeMetrics::healthy(), lan_config());

    let requests = (0..8).map(|_| {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run_cycle().await.outcome })
    });
    let outcomes: Vec<CycleOutcome> = join_all(requests)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let published = outcomes
        .iter()
        .filter(|o| **o == CycleOutcome::Published)
        .count();
    let busy = outcomes.iter().filter(|o| **o == CycleOutcome::Busy).count();
    assert_eq!(published, 1);
    assert_eq!(busy, 7);
    assert_eq!(probe.sweeps.peak(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn busy_request_returns_without_waiting() {
    let probe = Arc::new(FakeProbe::lan(1).with_sweep_delay(Duration::from_millis(500)));
    let coordinator = engine(probe, FakeMetrics::healthy(), lan_config());

    let running = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run_cycle().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.is_running());

    let started = Instant::now();
    let busy = coordinator.run_cycle().await;

    assert_eq!(busy.outcome, CycleOutcome::Busy);
    assert!(busy.snapshot.is_never_scanned());
    assert!(started.elapsed() < Duration::from_millis(250));

    let finished = running.await.unwrap();
    assert_eq!(finished.outcome, CycleOutcome::Published);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_see_old_or_new_snapshot_never_a_mix() {
    let probe = Arc::new(FakeProbe::lan(6).with_probe_delay(Duration::from_millis(30)));
    let config = ScanConfig {
        interval: Duration::from_millis(1),
        workers: 2,
        ..lan_config()
    };
    let coordinator = engine(probe, FakeMetrics::healthy(), config);

    let old = coordinator.run_cycle().await.snapshot;
    tokio::time::sleep(Duration::from_millis(5)).await;

    let cycle = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run_cycle().await })
    };

    let mut reads = Vec::new();
    while !cycle.is_finished() {
        reads.push(coordinator.cache().get());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let new = cycle.await.unwrap().snapshot;
    reads.push(coordinator.cache().get());

    assert!(!Arc::ptr_eq(&old, &new));
    for read in &reads {
        assert!(Arc::ptr_eq(read, &old) || Arc::ptr_eq(read, &new));
        assert_eq!(read.devices.len(), 6);
    }
    assert!(Arc::ptr_eq(reads.last().unwrap(), &new));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn detail_probes_never_exceed_worker_pool() {
    let probe = Arc::new(FakeProbe::lan(12).with_probe_delay(Duration::from_millis(20)));
    let config = ScanConfig {
        workers: 3,
        ..lan_config()
    };
    let coordinator = engine(probe.clone(), FakeMetrics::healthy(), config);

    let report = coordinator.run_cycle().await;

    assert_eq!(report.snapshot.devices.len(), 12);
    assert!(probe.probes.peak() <= 3);
    assert!(probe.probes.peak() > 1);
}
