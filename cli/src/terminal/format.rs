use std::net::{IpAddr, Ipv6Addr};

use chrono::{DateTime, Local, Utc};
use colored::*;

use vigil_common::inventory::{HostRecord, HostStatus, OsFact, PortFact, SystemMetrics, UNKNOWN};
use vigil_common::network::target::Target;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

const MIB: u64 = 1024 * 1024;

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    let first_byte = ipv6_addr.octets()[0];
    if (0x20..=0x3F).contains(&first_byte) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

pub fn target_to_detail(target: &Target) -> Detail {
    match target {
        Target::Addr(IpAddr::V4(ipv4_addr)) => (
            "IPv4".to_string(),
            ipv4_addr.to_string().color(colors::IPV4_ADDR),
        ),
        Target::Addr(IpAddr::V6(ipv6_addr)) => (
            ipv6_to_type_str(ipv6_addr).to_string(),
            ipv6_addr.to_string().color(colors::IPV6_ADDR),
        ),
        Target::Name(name) => ("Name".to_string(), name.color(colors::HOSTNAME)),
    }
}

pub fn os_to_detail(os: &OsFact) -> Detail {
    let value = if os.name == UNKNOWN {
        UNKNOWN.color(colors::MUTED)
    } else {
        format!("{} ({}%)", os.name, os.accuracy).color(colors::OS)
    };
    ("OS".to_string(), value)
}

pub fn status_to_detail(status: HostStatus) -> Detail {
    let value = match status {
        HostStatus::Up => "up".green(),
        HostStatus::Down => "down".red(),
        HostStatus::Unknown => "unknown".color(colors::MUTED),
    };
    ("Status".to_string(), value)
}

pub fn port_to_string(port: &PortFact) -> String {
    let mut out = format!("{}/{}", port.port, port.service);
    if !port.product.is_empty() {
        out.push(' ');
        out.push_str(&port.product);
        if !port.version.is_empty() {
            out.push(' ');
            out.push_str(&port.version);
        }
    }
    out
}

pub fn ports_to_detail(ports: &[PortFact]) -> Detail {
    let value = if ports.is_empty() {
        "none open".color(colors::MUTED)
    } else {
        ports
            .iter()
            .map(port_to_string)
            .collect::<Vec<_>>()
            .join(", ")
            .color(colors::PORT)
    };
    ("Ports".to_string(), value)
}

pub fn seen_to_detail(last_seen: &DateTime<Utc>) -> Detail {
    let local: DateTime<Local> = last_seen.with_timezone(&Local);
    (
        "Seen".to_string(),
        local.format("%H:%M:%S").to_string().normal(),
    )
}

pub fn host_to_details(host: &HostRecord) -> Vec<Detail> {
    vec![
        target_to_detail(&host.target),
        status_to_detail(host.status),
        os_to_detail(&host.os),
        ports_to_detail(&host.ports),
        seen_to_detail(&host.last_seen),
    ]
}

pub fn metrics_to_details(metrics: &SystemMetrics) -> Vec<Detail> {
    vec![
        (
            "CPU".to_string(),
            format!("{:.1}%", metrics.cpu_usage).normal(),
        ),
        (
            "Memory".to_string(),
            format!(
                "{} MiB used / {} MiB total ({} MiB free)",
                metrics.memory_used / MIB,
                metrics.memory_total / MIB,
                metrics.memory_free / MIB
            )
            .normal(),
        ),
    ]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
