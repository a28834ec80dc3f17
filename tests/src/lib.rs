//! Cross-crate tests of the scan engine.
//!
//! Everything except [`discovery`] runs against the in-memory collaborators
//! in [`fakes`], so timing and failures are fully scripted.

#![cfg(test)]

mod concurrency;
mod control;
mod cycle;
mod discovery;
mod fakes;
