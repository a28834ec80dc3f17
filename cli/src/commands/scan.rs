use std::time::Duration;

use anyhow::bail;
use colored::*;

use vigil_common::config::ScanConfig;
use vigil_common::inventory::InventorySnapshot;
use vigil_core::coordinator::CycleOutcome;
use vigil_core::service::InventoryService;

use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

/// Runs exactly one cycle and prints what it found.
pub async fn scan(config: ScanConfig, json: bool, quiet: u8) -> anyhow::Result<()> {
    let subnet = config.subnet.to_string();
    let service = InventoryService::from_config(ScanConfig {
        start_enabled: true,
        ..config
    });

    if !json {
        print::header("scanning the network", quiet);
        spinner::start(format!("Sweeping {subnet}"));
    }
    let report = service.request_cycle().await;
    spinner::stop();

    if report.outcome == CycleOutcome::DiscoveryFailed {
        bail!("host discovery failed for subnet '{subnet}'");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&*report.snapshot)?);
        return Ok(());
    }

    render_inventory(&report.snapshot, quiet);
    print_summary(&report.snapshot, report.failed_hosts, report.elapsed, quiet);
    Ok(())
}

pub fn render_inventory(snapshot: &InventorySnapshot, quiet: u8) {
    if snapshot.devices.is_empty() {
        print::header("zero hosts detected", quiet);
        if quiet == 0 {
            print::no_results();
        }
        return;
    }

    print::header("network inventory", quiet);
    for (idx, host) in snapshot.devices.iter().enumerate() {
        print::tree_head(idx, &host.hostname);
        print::as_tree_one_level(&format::host_to_details(host));
        if idx + 1 != snapshot.devices.len() {
            mprint!();
        }
    }

    if quiet == 0 {
        print::header("this machine", quiet);
        print::as_tree_one_level(&format::metrics_to_details(&snapshot.metrics));
    }
}

fn print_summary(snapshot: &InventorySnapshot, failed: usize, elapsed: Duration, quiet: u8) {
    let hosts: ColoredString = format!("{} hosts", snapshot.devices.len()).bold().green();
    let time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();
    let mut line = format!("Scan complete: {hosts} inventoried in {time}");
    if failed > 0 {
        line.push_str(&format!(", {} unreachable", failed.to_string().red()));
    }
    let line = line.color(colors::TEXT_DEFAULT).to_string();

    if quiet == 0 {
        print::fat_separator();
        print::centerln(&line);
    } else {
        print::print(&line);
    }
}
