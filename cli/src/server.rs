//! HTTP surface over the inventory service.
//!
//! `GET /api/network` never waits on a scan. The control routes only flip
//! the scanning flag; `POST /api/scan` asks for a cycle and answers with
//! whatever snapshot the request was served (possibly the cached one).

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use vigil_common::inventory::InventorySnapshot;
use vigil_core::service::InventoryService;

type AppState = Arc<InventoryService>;

#[derive(Debug, Serialize)]
struct ScanningState {
    scanning: bool,
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/api/network", get(network))
        .route("/api/scan", post(request_scan))
        .route("/api/scanning/start", post(start_scanning))
        .route("/api/scanning/stop", post(stop_scanning))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn network(State(service): State<AppState>) -> Json<Arc<InventorySnapshot>> {
    Json(service.snapshot())
}

async fn request_scan(State(service): State<AppState>) -> Json<Arc<InventorySnapshot>> {
    let report = service.request_cycle().await;
    info!(outcome = ?report.outcome, "scan requested over API");
    Json(report.snapshot)
}

async fn start_scanning(State(service): State<AppState>) -> Json<ScanningState> {
    service.start_scanning();
    Json(ScanningState {
        scanning: service.is_scanning(),
    })
}

async fn stop_scanning(State(service): State<AppState>) -> Json<ScanningState> {
    service.stop_scanning();
    Json(ScanningState {
        scanning: service.is_scanning(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
