use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use vigil_common::config::ScanConfig;
use vigil_core::coordinator::CycleOutcome;
use vigil_core::service::InventoryService;

use crate::commands::print_settings;
use crate::server;
use crate::terminal::print;

/// Runs the scan timer behind the HTTP API until Ctrl-C.
pub async fn serve(config: ScanConfig, listen: SocketAddr, quiet: u8) -> anyhow::Result<()> {
    print::header("serving the inventory", quiet);
    print_settings(&config, quiet);
    let service = Arc::new(InventoryService::from_config(config));
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding the API to {listen}"))?;

    info!(%listen, "API listening on http://{listen}/api/network");

    let app = server::router(Arc::clone(&service));
    let api = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .into_future();

    let timer = service.run_until(std::future::pending(), |report| {
        if report.outcome == CycleOutcome::Published {
            info!(hosts = report.snapshot.devices.len(), "inventory updated");
        }
    });

    tokio::select! {
        result = api => result.context("API server failed")?,
        _ = timer => warn!("scan timer stopped unexpectedly"),
    }

    info!("shutting down");
    Ok(())
}
