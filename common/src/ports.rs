//! # Outbound Ports (Driven Actors)
//!
//! Contracts for everything the engine asks of the outside world.
//!
//! ## Rules
//! 1. All items here are `traits` plus the plain data they exchange.
//! 2. No concrete implementations: those live in `vigil-core`'s adapters,
//!    or in test fakes.
//! 3. Every operation reports failure as an explicit error value; none of
//!    them panic on a bad host.

pub mod metrics_source;
pub mod probe_client;
