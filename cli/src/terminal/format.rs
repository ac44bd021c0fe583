use crate::terminal::colors;
use colored::*;
use hostsweep_common::report::{ReachabilityOutcome, ScanRecord, Status};
use std::net::{IpAddr, Ipv6Addr};

pub type Detail = (String, ColoredString);

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    if is_global_unicast(ipv6_addr) {
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

// 2000::/3
fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3F).contains(&first_byte)
}

pub fn status_to_str(status: Status) -> ColoredString {
    match status {
        Status::Active => status.as_str().color(colors::ACTIVE).bold(),
        Status::Inactive => status.as_str().color(colors::INACTIVE),
    }
}

/// One tree row per resolved address, keyed by address family.
pub fn address_to_detail(address: &str) -> Detail {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => ("IPv4".to_string(), v4.to_string().color(colors::IPV4_ADDR)),
        Ok(IpAddr::V6(v6)) => (
            ipv6_to_type_str(&v6).to_string(),
            v6.to_string().color(colors::IPV6_ADDR),
        ),
        Err(_) => ("Addr".to_string(), address.normal()),
    }
}

pub fn record_to_details(record: &ScanRecord) -> Vec<Detail> {
    let identity = &record.identity;
    let mut details: Vec<Detail> = vec![("Status".to_string(), status_to_str(record.status()))];

    details.extend(identity.addresses().iter().map(|a| address_to_detail(a)));

    if !identity.aliases().is_empty() {
        details.push(("Aliases".to_string(), identity.aliases().join(", ").normal()));
    }

    if let ReachabilityOutcome::ProbeError(reason) = &record.reachability {
        details.push(("Probe".to_string(), reason.color(colors::FAILURE)));
    }

    if let Some(reason) = identity.error() {
        details.push(("DNS".to_string(), reason.color(colors::FAILURE)));
    }

    details
}

/// The one-liner printed as each target completes.
pub fn live_status(record: &ScanRecord) -> String {
    let target = record.target.to_string().color(colors::PRIMARY);
    match record.status() {
        Status::Active => {
            let hostname = record.identity.hostname().unwrap_or("None");
            format!(
                "{target} is {}. Hostname: {}",
                "reachable".color(colors::ACTIVE),
                hostname.color(colors::ACCENT)
            )
        }
        Status::Inactive => format!("{target} is {}.", "not reachable".color(colors::INACTIVE)),
    }
}
