//! # Vigil Core
//!
//! The scan engine: everything between the timer and the published inventory.
//!
//! * **[`scheduler`]**: decides whether a cycle may start.
//! * **[`discovery`]**: turns the configured subnet into live hosts.
//! * **[`detail`]**: probes each live host on a bounded worker pool.
//! * **[`coordinator`]**: runs whole cycles, one at a time.
//! * **[`cache`]**: holds the snapshot readers are served.
//! * **[`service`]**: the surface the CLI and HTTP API talk to.
//! * **[`network`]** and **[`system`]**: the real probing and metrics adapters.

pub mod cache;
pub mod coordinator;
pub mod detail;
pub mod discovery;
pub mod network;
pub mod scheduler;
pub mod service;
pub mod system;
