//! # Sweep Subnet
//!
//! Defines what the host discovery stage sweeps each cycle.
//!
//! A subnet specification can be:
//! * `auto`: the local /24, derived from this machine's own IPv4 address.
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * An IPv4 range (e.g., `192.168.1.1-100` or `192.168.1.1-192.168.1.100`).
//! * A single address.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::network::range::{self, Ipv4Range};

/// Largest number of addresses a single sweep may cover (a /16).
pub const MAX_SWEEP_ADDRESSES: u64 = 1 << 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Subnet {
    /// The /24 around the local address, resolved at sweep time.
    #[default]
    Auto,
    /// A CIDR block. Only usable host addresses are swept.
    Block { network: Ipv4Addr, prefix: u8 },
    /// An inclusive range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// One address.
    Single { addr: IpAddr },
}

impl Subnet {
    /// The /24 containing `local`, last octet zeroed.
    pub fn local_24(local: Ipv4Addr) -> Self {
        let [a, b, c, _] = local.octets();
        Subnet::Block {
            network: Ipv4Addr::new(a, b, c, 0),
            prefix: 24,
        }
    }

    /// Replaces [`Subnet::Auto`] with the concrete /24 around the address
    /// returned by `local`. Returns `None` when `local` cannot supply one.
    pub fn resolve(&self, local: impl FnOnce() -> Option<Ipv4Addr>) -> Option<Subnet> {
        match self {
            Subnet::Auto => local().map(Subnet::local_24),
            other => Some(other.clone()),
        }
    }

    /// Number of addresses [`Subnet::addresses`] yields.
    pub fn len(&self) -> u64 {
        match self {
            Subnet::Auto => 0,
            Subnet::Block { network, prefix } => range::host_range(*network, *prefix)
                .map(|r| r.len())
                .unwrap_or(0),
            Subnet::Range { ipv4_range } => ipv4_range.len(),
            Subnet::Single { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the subnet into addresses, ascending. [`Subnet::Auto`] must be
    /// resolved first and expands to nothing.
    pub fn addresses(&self) -> Vec<IpAddr> {
        match self {
            Subnet::Auto => Vec::new(),
            Subnet::Block { network, prefix } => range::host_range(*network, *prefix)
                .map(|r| r.to_iter().collect())
                .unwrap_or_default(),
            Subnet::Range { ipv4_range } => ipv4_range.to_iter().collect(),
            Subnet::Single { addr } => vec![*addr],
        }
    }
}

impl FromStr for Subnet {
    type Err = String;

    /// Parses a string into a `Subnet`.
    ///
    /// Supported formats:
    /// * **Keyword**: "auto" (case-insensitive).
    /// * **Host**: Single IPv4/IPv6 address (e.g., "192.168.1.5").
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("auto") {
            return Ok(Subnet::Auto);
        }

        if let Ok(addr) = s.parse::<IpAddr>() {
            return Ok(Subnet::Single { addr });
        }

        if let Some(subnet) = parse_ip_range(s)? {
            return Ok(subnet);
        }

        if let Some(subnet) = parse_cidr(s)? {
            return Ok(subnet);
        }

        Err(format!("invalid subnet: {s}"))
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subnet::Auto => f.write_str("auto"),
            Subnet::Block { network, prefix } => write!(f, "{network}/{prefix}"),
            Subnet::Range { ipv4_range } => {
                write!(f, "{}-{}", ipv4_range.start_addr, ipv4_range.end_addr)
            }
            Subnet::Single { addr } => write!(f, "{addr}"),
        }
    }
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(s: &str) -> Result<Option<Subnet>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid start IP in range '{start_str}': {e}"))?;

    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr, s)?;

    if u32::from(start_addr) > u32::from(end_addr) {
        return Err(format!("Range start is after range end: {s}"));
    }

    Ok(Some(Subnet::Range {
        ipv4_range: Ipv4Range::new(start_addr, end_addr),
    }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, String> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(format!("End range cannot be empty: {original_s}"));
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| format!("Invalid end range '{end_str}': {e}"))?;

    if partial_octets.len() > 4 {
        return Err(format!("End range has too many octets: {end_str}"));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr(s: &str) -> Result<Option<Subnet>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid IP in CIDR '{ip_str}': {e}"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    let block = range::cidr_range(ipv4_addr, prefix)?;

    Ok(Some(Subnet::Block {
        network: block.start_addr,
        prefix,
    }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
