pub mod scan;
pub mod serve;
pub mod watch;

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use vigil_common::config::{DEFAULT_MAX_HOSTS, DEFAULT_PORTS, DEFAULT_WORKERS, ScanConfig};
use vigil_common::error::ConfigError;

use crate::terminal::print;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "A continuously-running network inventory.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less output (warnings and results only)
    #[arg(short, long, action = ArgAction::Count, global = true, conflicts_with = "verbose")]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scan cycle and print the inventory
    #[command(alias = "s")]
    Scan {
        #[command(flatten)]
        opts: ScanArgs,
        /// Print the inventory as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep scanning on a timer and report every new inventory
    #[command(alias = "w")]
    Watch {
        #[command(flatten)]
        opts: ScanArgs,
    },
    /// Keep scanning and serve the inventory over HTTP
    Serve {
        #[command(flatten)]
        opts: ScanArgs,
        /// Address the API listens on
        #[arg(long, default_value = "127.0.0.1:5000")]
        listen: SocketAddr,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Seconds between completed scan cycles
    #[arg(long, default_value_t = 30)]
    pub interval: u64,

    /// Most hosts probed in detail per cycle
    #[arg(long, default_value_t = DEFAULT_MAX_HOSTS)]
    pub max_hosts: usize,

    /// auto, a CIDR block (10.0.0.0/24), a range (10.0.0.1-50) or one address
    #[arg(long, default_value = "auto")]
    pub subnet: String,

    /// Hosts probed at the same time
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-host probe timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// TCP ports probed on each host, comma separated
    #[arg(long, value_delimiter = ',')]
    pub ports: Option<Vec<u16>>,

    /// Start with scanning paused
    #[arg(long)]
    pub paused: bool,
}

impl ScanArgs {
    /// Builds and validates the scan configuration.
    pub fn to_config(&self) -> Result<ScanConfig, ConfigError> {
        let config = ScanConfig {
            interval: Duration::from_secs(self.interval),
            max_hosts: self.max_hosts,
            subnet: ScanConfig::parse_subnet(&self.subnet)?,
            workers: self.workers,
            probe_timeout: Duration::from_secs(self.timeout),
            ports: self
                .ports
                .clone()
                .unwrap_or_else(|| DEFAULT_PORTS.to_vec()),
            start_enabled: !self.paused,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Echoes the effective settings before a long-running command starts.
pub fn print_settings(config: &ScanConfig, quiet: u8) {
    if quiet > 0 {
        return;
    }
    const WIDTH: usize = 9;
    print::aligned_line("Subnet", WIDTH, config.subnet.to_string());
    print::aligned_line("Interval", WIDTH, format!("{}s", config.interval.as_secs()));
    print::aligned_line("Max hosts", WIDTH, config.max_hosts.to_string());
    print::aligned_line("Workers", WIDTH, config.workers.to_string());
    print::aligned_line("Ports", WIDTH, format!("{} per host", config.ports.len()));
    print::aligned_line(
        "Scanning",
        WIDTH,
        if config.start_enabled { "on" } else { "paused" },
    );
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
