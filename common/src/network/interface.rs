//! Local network detection for the `lan` target keyword.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use thiserror::Error;

use crate::debug;
use crate::error::ScanError;

/// Why an interface cannot stand in for the local network.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    #[error("interface is down")]
    IsDown,
    #[error("loopback device")]
    IsLoopback,
    #[error("no broadcast support")]
    NotBroadcast,
    /// e.g. a VPN tunnel
    #[error("point-to-point link")]
    IsPointToPoint,
    #[error("no private IPv4 network")]
    NoPrivateIpv4,
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn get_private_ipv4_net(&self) -> Option<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }

    fn get_private_ipv4_net(&self) -> Option<Ipv4Network> {
        self.get_ipv4_nets()
            .into_iter()
            .find(|net| net.ip().is_private())
    }
}

/// Finds the primary LAN and returns its IPv4 network.
pub fn get_lan_network() -> Result<Ipv4Network, ScanError> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| match is_viable_lan_interface(interface) {
            Ok(()) => true,
            Err(reason) => {
                debug!("Skipping interface {}: {reason}", interface.name);
                false
            }
        })
        .collect();

    let interface: NetworkInterface = select_best_lan_interface(interfaces, is_wired)
        .ok_or_else(|| ScanError::NoLocalNetwork("no interface is up with a private IPv4 address".into()))?;

    interface.get_private_ipv4_net().ok_or_else(|| {
        ScanError::NoLocalNetwork(format!("{} has no private IPv4 network", interface.name))
    })
}

fn is_viable_lan_interface(interface: &NetworkInterface) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() {
        return Err(ViabilityError::IsLoopback);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    if interface.get_private_ipv4_net().is_none() {
        return Err(ViabilityError::NoPrivateIpv4);
    }
    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = interfaces.iter().position(|interface| is_wired(interface));
    let idx = wired.unwrap_or(0);
    interfaces.into_iter().nth(idx)
}

#[cfg(target_os = "linux")]
fn is_wired(interface: &NetworkInterface) -> bool {
    use std::path::Path;
    let sys = format!("/sys/class/net/{}", interface.name);
    Path::new(&format!("{sys}/device")).exists() && !Path::new(&format!("{sys}/wireless")).exists()
}

#[cfg(not(target_os = "linux"))]
fn is_wired(interface: &NetworkInterface) -> bool {
    interface.name.starts_with("en") || interface.name.starts_with("eth")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
