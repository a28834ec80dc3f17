//! Addressing primitives: what gets swept, what gets probed, and how the
//! local network is identified.

pub mod interface;
pub mod range;
pub mod subnet;
pub mod target;
