//! Concrete probing: TCP connects, banner reading and reverse DNS.

pub mod banner;
pub mod resolver;
pub mod tcp;
