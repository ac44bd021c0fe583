//! # Address Ranges
//!
//! Turns CIDR blocks and start/end ranges into ordered target lists.
//!
//! Expansion is literal: the network and broadcast addresses of a block are
//! part of the output, in ascending numeric order.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;
use crate::network::target::Target;

/// A CIDR block, e.g. `192.168.1.0/24`.
///
/// The host bits of the written address are ignored: `192.168.1.77/24`
/// describes the same block as `192.168.1.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    network: Ipv4Network,
}

impl AddressRange {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        let network = Ipv4Network::new(addr, prefix)
            .map_err(|e| ScanError::invalid_range(&format!("{addr}/{prefix}"), e))?;
        Ok(Self { network })
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn network_addr(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn broadcast_addr(&self) -> Ipv4Addr {
        self.network.broadcast()
    }

    /// Number of addresses in the block, `2^(32 - prefix)`.
    pub fn len(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix()))
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_ipv4_range(&self) -> Ipv4Range {
        Ipv4Range::new(self.network_addr(), self.broadcast_addr())
    }

    /// Expands the block into targets, refusing blocks larger than `max_targets`.
    pub fn expand(&self, max_targets: u64) -> Result<Vec<Target>, ScanError> {
        self.to_ipv4_range().expand(max_targets)
    }
}

impl FromStr for AddressRange {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((ip_str, prefix_str)) = s.split_once('/') else {
            return Err(ScanError::invalid_range(s, "expected <network>/<prefix>"));
        };

        let addr = ip_str
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|e| ScanError::invalid_range(s, format!("bad network address: {e}")))?;

        let prefix = prefix_str
            .trim()
            .parse::<u8>()
            .map_err(|e| ScanError::invalid_range(s, format!("bad prefix length: {e}")))?;

        if prefix > 32 {
            return Err(ScanError::invalid_range(s, "prefix length must be within 0..=32"));
        }

        Self::new(addr, prefix)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_addr(), self.prefix())
    }
}

/// An inclusive run of IPv4 addresses.
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

    pub fn len(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        if start > end {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(|ip| IpAddr::V4(Ipv4Addr::from(ip)))
    }

    /// Materialises the range. The size check runs before anything is allocated.
    pub fn expand(&self, max_targets: u64) -> Result<Vec<Target>, ScanError> {
        let requested = self.len();
        if requested > max_targets {
            return Err(ScanError::RangeTooLarge {
                requested,
                max: max_targets,
            });
        }
        Ok(self.to_iter().map(Target::Addr).collect())
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_addr, self.end_addr)
    }
}

/// Expands a CIDR string into its targets.
pub fn cidr_to_targets(range: &str, max_targets: u64) -> Result<Vec<Target>, ScanError> {
    range.parse::<AddressRange>()?.expand(max_targets)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
