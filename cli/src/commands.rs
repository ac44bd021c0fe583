pub mod expand;
pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use hostsweep_common::config::{
    Config, DEFAULT_CONCURRENCY, DEFAULT_HOST_TIMEOUT, DEFAULT_MAX_TARGETS, ScanConfig,
};
use hostsweep_common::network::target::TargetSpec;

#[derive(Parser)]
#[command(name = "hostsweep", version)]
#[command(about = "Ping sweep with reverse DNS and CSV export.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat for only the summary
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Skip reverse DNS lookups
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Do not listen for 'q' to stop early
    #[arg(long = "no-input", global = true)]
    pub disable_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe and resolve every host of a range or list
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Print the addresses a range expands to
    #[command(alias = "e")]
    Expand {
        range: TargetSpec,
        #[arg(long, default_value_t = DEFAULT_MAX_TARGETS)]
        max_targets: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProbeKind {
    /// One ICMP echo through the system `ping`
    Ping,
    /// TCP handshake; a refused connection still counts as alive
    Tcp,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// CIDR block, range, host, `lan`, or a comma separated mix. Prompted for when omitted
    pub target: Option<TargetSpec>,

    /// Targets in flight at once
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Budget for each probe and each lookup
    #[arg(short, long = "timeout-ms", default_value_t = DEFAULT_HOST_TIMEOUT.as_millis() as u64)]
    pub timeout_ms: u64,

    /// Stop the whole scan after this long; unfinished hosts are marked
    #[arg(short, long = "deadline-ms")]
    pub deadline_ms: Option<u64>,

    /// Only look up names of hosts that answered
    #[arg(long)]
    pub resolve_only_reachable: bool,

    /// Refuse ranges larger than this
    #[arg(long, default_value_t = DEFAULT_MAX_TARGETS)]
    pub max_targets: u64,

    #[arg(short, long, value_enum, default_value_t = ProbeKind::Ping)]
    pub probe: ProbeKind,

    /// Port for `--probe tcp`
    #[arg(long, default_value_t = hostsweep_core::network::tcp::DEFAULT_PORT)]
    pub port: u16,

    /// CSV destination; defaults to scan_results_<timestamp>.csv
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not write a CSV file
    #[arg(long, conflicts_with = "output")]
    pub no_export: bool,
}

impl ScanArgs {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_concurrency(self.concurrency)
            .with_per_host_timeout(Duration::from_millis(self.timeout_ms))
            .with_overall_deadline(self.deadline_ms.map(Duration::from_millis))
            .with_resolve_only_if_reachable(self.resolve_only_reachable)
            .with_max_targets(self.max_targets)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            no_dns: self.no_dns,
            quiet: self.quiet,
            disable_input: self.disable_input,
        }
    }
}
