//! # Vigil Common
//!
//! Shared vocabulary of the inventory engine.
//!
//! * **[`inventory`]**: snapshot, host record and fact models.
//! * **[`network`]**: subnets, targets and local network identity.
//! * **[`ports`]**: capability traits implemented by the probing and metrics adapters.
//! * **[`config`]**: process-wide scan configuration.
//! * **[`error`]**: the failure taxonomy shared by every stage.

pub mod config;
pub mod error;
pub mod inventory;
pub mod network;
pub mod ports;
