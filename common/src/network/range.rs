//! # IPv4 Range Model
//!
//! Inclusive ranges of IPv4 addresses, used by [`crate::network::subnet::Subnet`]
//! to represent sweeps like `192.168.1.1-100` or a CIDR block `192.168.1.0/24`.

use std::net::{IpAddr, Ipv4Addr};

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        self.iter().map(IpAddr::V4)
    }

    /// Number of addresses covered. Zero when `start_addr > end_addr`.
    pub fn len(&self) -> u64 {
        let start = u64::from(u32::from(self.start_addr));
        let end = u64::from(u32::from(self.end_addr));
        if start > end { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let ip = u32::from(addr);
        u32::from(self.start_addr) <= ip && ip <= u32::from(self.end_addr)
    }
}

/// Creates a range from an IP and a CIDR prefix (e.g., 192.168.1.0/24).
///
/// Returns the range covering the entire network block, network and
/// broadcast addresses included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, String> {
    if prefix > 32 {
        return Err(format!("Invalid prefix: {prefix} > 32"));
    }
    let ip_u32 = u32::from(ip);
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    let network = ip_u32 & mask;
    let broadcast = network | !mask;
    Ok(Ipv4Range::new(
        Ipv4Addr::from(network),
        Ipv4Addr::from(broadcast),
    ))
}

/// Usable host addresses of a CIDR block.
///
/// Blocks larger than /31 lose their network and broadcast addresses;
/// /31 and /32 are returned whole.
pub fn host_range(ip: Ipv4Addr, prefix: u8) -> Result<Ipv4Range, String> {
    let block = cidr_range(ip, prefix)?;
    if prefix >= 31 {
        return Ok(block);
    }
    let start = u32::from(block.start_addr).saturating_add(1);
    let end = u32::from(block.end_addr).saturating_sub(1);
    Ok(Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
