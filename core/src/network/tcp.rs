use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hostsweep_common::debug;
use hostsweep_common::network::target::Target;
use hostsweep_common::probe::ReachabilityProbe;
use hostsweep_common::report::ReachabilityOutcome;
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const DEFAULT_PORT: u16 = 443;

/// Treats any answer to a TCP SYN as proof of life.
///
/// A completed handshake and an active refusal (RST) both mean a host is
/// there. Silence until the timeout means it is not. Works without raw
/// sockets or an external `ping` binary.
#[derive(Debug, Clone, Copy)]
pub struct TcpHandshakeProbe {
    port: u16,
}

impl Default for TcpHandshakeProbe {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl TcpHandshakeProbe {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn handshake(&self, addr: IpAddr, budget: Duration) -> ReachabilityOutcome {
        let socket_addr = SocketAddr::new(addr, self.port);

        match timeout(budget, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_)) => ReachabilityOutcome::Reachable,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => ReachabilityOutcome::Reachable,
            Ok(Err(e)) => {
                debug!("{socket_addr}: {e}");
                ReachabilityOutcome::Unreachable
            }
            Err(_elapsed) => ReachabilityOutcome::Unreachable,
        }
    }
}

#[async_trait]
impl ReachabilityProbe for TcpHandshakeProbe {
    async fn probe(&self, target: &Target, budget: Duration) -> ReachabilityOutcome {
        let addr = match target {
            Target::Addr(ip) => *ip,
            Target::Name(name) => {
                let lookup = tokio::net::lookup_host((name.as_str(), self.port));
                match timeout(budget, lookup).await {
                    Ok(Ok(mut addrs)) => match addrs.next() {
                        Some(sa) => sa.ip(),
                        None => return ReachabilityOutcome::Unreachable,
                    },
                    Ok(Err(e)) => {
                        return ReachabilityOutcome::ProbeError(format!("cannot resolve {name}: {e}"));
                    }
                    Err(_elapsed) => return ReachabilityOutcome::Unreachable,
                }
            }
        };
        self.handshake(addr, budget).await
    }

    fn name(&self) -> &'static str {
        "tcp-handshake"
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
