//! Cycle gating.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Decides whether a new cycle may start.
///
/// A disabled scanner never runs. An enabled one runs when no cycle has
/// completed yet, or when at least `interval` has passed since the last one.
/// A `last_completed_at` in the future (wall clock stepped back) counts as
/// zero elapsed time.
pub fn should_run(
    now: DateTime<Utc>,
    last_completed_at: Option<DateTime<Utc>>,
    interval: Duration,
    enabled: bool,
) -> bool {
    if !enabled {
        return false;
    }
    let Some(last) = last_completed_at else {
        return true;
    };
    let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
    elapsed >= interval
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
