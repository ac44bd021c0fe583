//! Concrete [`ReachabilityProbe`](hostsweep_common::probe::ReachabilityProbe) implementations.

pub mod icmp;
pub mod tcp;

pub use icmp::PingProbe;
pub use tcp::TcpHandshakeProbe;
