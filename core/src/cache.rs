//! # Inventory Cache
//!
//! Owns the shared scan state: the current snapshot, the scanning-enabled
//! flag and the completion time of the last cycle. All three sit behind one
//! lock, so the scheduler's view of "enabled" and "last completed" can never
//! interleave with a cycle finishing.
//!
//! Readers only ever clone an `Arc`, so the lock is held for a pointer copy
//! and never across a scan.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use vigil_common::inventory::InventorySnapshot;

use crate::scheduler;

#[derive(Debug)]
struct ScanState {
    current: Arc<InventorySnapshot>,
    enabled: bool,
    last_completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct InventoryCache {
    state: RwLock<ScanState>,
}

impl InventoryCache {
    /// A cache holding the "never scanned" snapshot.
    pub fn new(enabled: bool) -> Self {
        Self {
            state: RwLock::new(ScanState {
                current: Arc::new(InventorySnapshot::empty(enabled)),
                enabled,
                last_completed_at: None,
            }),
        }
    }

    /// The last published snapshot. Never waits on a running cycle.
    pub fn get(&self) -> Arc<InventorySnapshot> {
        Arc::clone(&self.state.read().current)
    }

    /// Atomically replaces the current snapshot.
    ///
    /// `scanning` is not preserved: the stored snapshot is stamped with the
    /// live enabled flag, so a cycle that finishes after `set_enabled(false)`
    /// reads back with `scanning: false`. Every other field is stored as
    /// given, and the timestamp becomes the last completion time seen by the
    /// scheduler.
    pub fn publish(&self, mut snapshot: InventorySnapshot) -> Arc<InventorySnapshot> {
        let mut state = self.state.write();
        snapshot.scanning = state.enabled;
        if let Some(ts) = snapshot.timestamp {
            state.last_completed_at = Some(ts);
        }
        let published = Arc::new(snapshot);
        state.current = Arc::clone(&published);
        debug!(
            devices = published.devices.len(),
            "inventory snapshot published"
        );
        published
    }

    /// Toggles scanning. The current snapshot is re-issued carrying the new
    /// flag; its host data is untouched.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.write();
        if state.enabled == enabled {
            return;
        }
        state.enabled = enabled;
        let mut relabeled = InventorySnapshot::clone(&state.current);
        relabeled.scanning = enabled;
        state.current = Arc::new(relabeled);
        info!(enabled, "scanning flag changed");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    pub fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_completed_at
    }

    /// Asks the scheduler whether a cycle may start at `now`, reading the
    /// flag and the last completion time in one critical section.
    pub fn should_run(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        let state = self.state.read();
        scheduler::should_run(now, state.last_completed_at, interval, state.enabled)
    }
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::new(true)
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
