//! Local network identity.
//!
//! Works out which IPv4 address this machine uses on its LAN so the
//! discovery stage can derive the subnet to sweep.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use tracing::debug;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// Loopback interfaces never front a LAN.
    IsLoopback,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address.
    NoPrivateIpv4,
}

/// Returns the IPv4 address this machine uses on its local network.
///
/// The routing table is consulted first (the source address the kernel
/// would pick for an outbound datagram); when that is unavailable the
/// best viable interface is used instead.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    if let Some(ip) = routed_source_ipv4() {
        debug!(%ip, "local address resolved from routing table");
        return Some(ip);
    }
    let ip = select_lan_ipv4(&datalink::interfaces());
    if let Some(ip) = ip {
        debug!(%ip, "local address resolved from interface list");
    }
    ip
}

/// Picks a private IPv4 address from the first viable interface.
pub fn select_lan_ipv4(interfaces: &[NetworkInterface]) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|interface| is_viable_lan_interface(interface).is_ok())
        .find_map(private_ipv4)
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if private_ipv4(interface).is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn private_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) if v4.ip().is_private() => Some(v4.ip()),
        _ => None,
    })
}

// Connecting a UDP socket sends nothing; it only fixes the route.
fn routed_source_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 53)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
