//! # Probe Target
//!
//! The identity of a single host within a snapshot: either an address
//! or a hostname handed to the probe client verbatim.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Addr(IpAddr),
    Name(String),
}

impl Target {
    pub fn addr(&self) -> Option<IpAddr> {
        match self {
            Target::Addr(ip) => Some(*ip),
            Target::Name(_) => None,
        }
    }
}

impl From<IpAddr> for Target {
    fn from(ip: IpAddr) -> Self {
        Target::Addr(ip)
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("target cannot be empty".to_string());
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Target::Addr(ip));
        }
        if s.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(format!("invalid target: {s}"));
        }
        Ok(Target::Name(s.to_ascii_lowercase()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Addr(ip) => write!(f, "{ip}"),
            Target::Name(name) => f.write_str(name),
        }
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
