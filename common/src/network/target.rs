//! # Scan Target Model
//!
//! Defines what can be scanned and how it is written on the command line.
//!
//! A [`TargetSpec`] is the parsed expression; it can be:
//! * A single IP address or host name (`192.168.1.5`, `printer.lan`).
//! * An IPv4 range (`192.168.1.1-100`, `10.0.0.1-10.0.0.20`).
//! * A CIDR block (`192.168.1.0/24`).
//! * The local LAN (`lan`, detected automatically).
//! * A comma separated mix of the above.
//!
//! [`TargetSpec::to_targets`] flattens an expression into the ordered list of
//! [`Target`]s the engine works on. Explicit hosts keep their written order and
//! are never de-duplicated.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::error::ScanError;
use crate::network::interface;
use crate::network::range::{AddressRange, Ipv4Range};
use crate::info;

/// One unit of work for the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Addr(IpAddr),
    /// A host name taken verbatim from the input; resolved by the probes themselves.
    Name(String),
}

impl Target {
    /// Builds a target from a single host string, IP address or host name.
    pub fn parse_host(s: &str) -> Result<Self, ScanError> {
        let s = s.trim();
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Target::Addr(ip));
        }
        if is_hostname(s) {
            return Ok(Target::Name(s.to_string()));
        }
        Err(ScanError::invalid_target(s, "not an IP address or host name"))
    }

    pub fn ip(&self) -> Option<IpAddr> {
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

impl From<Ipv4Addr> for Target {
    fn from(ip: Ipv4Addr) -> Self {
        Target::Addr(IpAddr::V4(ip))
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

/// Parses every entry of an explicit host list, keeping order and duplicates.
pub fn parse_hosts<I, S>(hosts: I) -> Result<Vec<Target>, ScanError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hosts
        .into_iter()
        .map(|host| Target::parse_host(host.as_ref()))
        .collect()
}

/// A parsed target expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetSpec {
    /// The local area network of the best available interface.
    Lan,
    /// A single host.
    Host { target: Target },
    /// A CIDR block.
    Cidr { range: AddressRange },
    /// An arbitrary start/end range.
    Range { ipv4_range: Ipv4Range },
    /// Several expressions, scanned in the order they were written.
    Multi { specs: Vec<TargetSpec> },
}

impl FromStr for TargetSpec {
    type Err = ScanError;

    /// Parses a string into a `TargetSpec`.
    ///
    /// Supported formats:
    /// * **Keyword**: "lan" (case-insensitive).
    /// * **Host**: IPv4/IPv6 address or a host name.
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScanError::invalid_target(s, "empty target"));
        }

        if s.eq_ignore_ascii_case("lan") {
            return Ok(TargetSpec::Lan);
        }

        if s.contains(',') {
            return parse_commas(s);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(TargetSpec::Host {
                target: Target::Addr(ip),
            });
        }

        if s.contains('/') {
            let range = s.parse::<AddressRange>()?;
            return Ok(TargetSpec::Cidr { range });
        }

        if let Some(spec) = parse_ip_range(s)? {
            return Ok(spec);
        }

        if is_hostname(s) {
            return Ok(TargetSpec::Host {
                target: Target::Name(s.to_string()),
            });
        }

        Err(ScanError::invalid_target(s, "unrecognised target format"))
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Lan => f.write_str("lan"),
            TargetSpec::Host { target } => write!(f, "{target}"),
            TargetSpec::Cidr { range } => write!(f, "{range}"),
            TargetSpec::Range { ipv4_range } => write!(f, "{ipv4_range}"),
            TargetSpec::Multi { specs } => {
                let joined: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
                f.write_str(&joined.join(", "))
            }
        }
    }
}

impl TargetSpec {
    /// Flattens the expression into an ordered target list.
    ///
    /// The `max_targets` guard applies to the whole expression, so a comma
    /// separated list of small ranges cannot sneak past it.
    pub fn to_targets(&self, max_targets: u64) -> Result<Vec<Target>, ScanError> {
        let mut targets: Vec<Target> = Vec::new();
        collect_targets(self, max_targets, &mut targets)?;

        let len: usize = targets.len();
        let unit: &str = if len == 1 { "target has" } else { "targets have" };
        info!("{len} {unit} been parsed from {self}");

        Ok(targets)
    }
}

fn collect_targets(
    spec: &TargetSpec,
    max_targets: u64,
    out: &mut Vec<Target>,
) -> Result<(), ScanError> {
    let collected: u64 = out.len() as u64;
    let remaining: u64 = max_targets.saturating_sub(collected);
    let reject = |requested: u64| ScanError::RangeTooLarge {
        requested: requested + collected,
        max: max_targets,
    };

    match spec {
        TargetSpec::Lan => {
            let net = interface::get_lan_network()?;
            let range = AddressRange::new(net.network(), net.prefix())?;
            info!("Scanning local network {range}");
            if range.len() > remaining {
                return Err(reject(range.len()));
            }
            out.extend(range.expand(remaining)?);
        }
        TargetSpec::Host { target } => {
            if remaining == 0 {
                return Err(reject(1));
            }
            out.push(target.clone());
        }
        TargetSpec::Cidr { range } => {
            if range.len() > remaining {
                return Err(reject(range.len()));
            }
            out.extend(range.expand(remaining)?);
        }
        TargetSpec::Range { ipv4_range } => {
            if ipv4_range.len() > remaining {
                return Err(reject(ipv4_range.len()));
            }
            out.extend(ipv4_range.expand(remaining)?);
        }
        TargetSpec::Multi { specs } => {
            for spec in specs {
                collect_targets(spec, max_targets, out)?;
            }
        }
    }
    Ok(())
}

/// Parses a comma-separated list of targets (e.g., "192.168.1.5, 10.0.0.1-50, lan").
pub fn parse_commas(s: &str) -> Result<TargetSpec, ScanError> {
    let mut specs = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        specs.push(TargetSpec::from_str(part)?);
    }

    if specs.is_empty() {
        return Err(ScanError::invalid_target(s, "no targets in list"));
    }

    Ok(TargetSpec::Multi { specs })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
///
/// Returns `Ok(None)` when the left side is not an IPv4 address, so that host
/// names containing dashes fall through to host name parsing.
fn parse_ip_range(s: &str) -> Result<Option<TargetSpec>, ScanError> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let Ok(start_addr) = start_str.trim().parse::<Ipv4Addr>() else {
        return Ok(None);
    };

    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr, s)?;
    if u32::from(end_addr) < u32::from(start_addr) {
        return Err(ScanError::invalid_range(s, "range end is below range start"));
    }

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Some(TargetSpec::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, ScanError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(ScanError::invalid_range(original_s, "range end cannot be empty"));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|e| ScanError::invalid_range(original_s, format!("bad range end '{end_str}': {e}")))?;

    if partial_octets.len() > 4 {
        return Err(ScanError::invalid_range(
            original_s,
            format!("range end has too many octets: {end_str}"),
        ));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Accepts RFC 1123 style names. Purely numeric dotted strings are rejected so
/// that typos such as `10.0.0.256` are not mistaken for host names.
fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    if s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    s.trim_end_matches('.').split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
