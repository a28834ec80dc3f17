use colored::*;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

use vigil_common::config::ScanConfig;
use vigil_core::coordinator::{CycleOutcome, CycleReport};
use vigil_core::service::InventoryService;

use crate::commands::print_settings;
use crate::commands::scan::render_inventory;
use crate::terminal::input::{InputHandle, Key};
use crate::terminal::{colors, print};

const KEY_HELP: &str = "p pause · r resume · s show inventory · q quit";

/// Runs the scan timer in the foreground until the user quits.
pub async fn watch(config: ScanConfig, quiet: u8) -> anyhow::Result<()> {
    print::header("watching the network", quiet);
    print_settings(&config, quiet);
    let service = InventoryService::from_config(config);
    print::print_status(KEY_HELP.color(colors::MUTED).to_string());

    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let input = InputHandle::start(key_tx);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let shutdown = async {
        let _ = stop_rx.await;
    };
    let timer = service.run_until(shutdown, |report| report_cycle(report, quiet));

    tokio::join!(timer, controls(&service, key_rx, stop_tx, quiet));
    drop(input);

    print::end_of_program();
    Ok(())
}

async fn controls(
    service: &InventoryService,
    mut keys: mpsc::UnboundedReceiver<Key>,
    stop: oneshot::Sender<()>,
    quiet: u8,
) {
    loop {
        tokio::select! {
            key = keys.recv() => match key {
                Some(Key::Pause) => {
                    service.stop_scanning();
                    info!("scanning paused");
                }
                Some(Key::Resume) => {
                    service.start_scanning();
                    info!("scanning resumed");
                }
                Some(Key::Show) => render_inventory(&service.snapshot(), quiet),
                Some(Key::Quit) => break,
                // No keyboard: only Ctrl-C can end the watch.
                None => {
                    let _ = tokio::signal::ctrl_c().await;
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    let _ = stop.send(());
}

fn report_cycle(report: &CycleReport, quiet: u8) {
    match report.outcome {
        CycleOutcome::Published => {
            let snapshot = &report.snapshot;
            let up = snapshot.devices.len();
            let open: usize = snapshot.devices.iter().map(|d| d.open_ports().count()).sum();
            info!(
                hosts = up,
                open_ports = open,
                unreachable = report.failed_hosts,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "inventory updated"
            );
            if quiet == 0 {
                render_inventory(snapshot, quiet);
            }
        }
        CycleOutcome::DiscoveryFailed => {
            info!("keeping the previous inventory");
        }
        CycleOutcome::Busy | CycleOutcome::Skipped => {}
    }
}
