use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hostsweep_common::debug;
use hostsweep_common::network::target::Target;
use hostsweep_common::probe::IdentityResolver;
use hostsweep_common::report::{
    DNS_DISABLED, INVALID_ADDRESS, IdentityResult, LOOKUP_TIMED_OUT, NO_PTR_RECORD,
};

/// Reverse lookup through the operating system resolver (`getnameinfo`).
///
/// The system calls block, so each lookup runs on the blocking pool. A lookup
/// that outlives its budget is abandoned; the thread finishes on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl SystemResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityResolver for SystemResolver {
    async fn resolve(&self, target: &Target, timeout: Duration) -> IdentityResult {
        let target = target.clone();
        let lookup = tokio::task::spawn_blocking(move || lookup_identity(&target));

        match tokio::time::timeout(timeout, lookup).await {
            Ok(Ok(identity)) => identity,
            Ok(Err(join_err)) => IdentityResult::unresolved(format!("lookup failed: {join_err}")),
            Err(_elapsed) => IdentityResult::unresolved(LOOKUP_TIMED_OUT),
        }
    }

    fn name(&self) -> &'static str {
        "system-dns"
    }
}

/// Stand-in resolver used when name resolution is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledResolver;

#[async_trait]
impl IdentityResolver for DisabledResolver {
    async fn resolve(&self, _target: &Target, _timeout: Duration) -> IdentityResult {
        IdentityResult::unresolved(DNS_DISABLED)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

fn lookup_identity(target: &Target) -> IdentityResult {
    let (ip, queried) = match target {
        Target::Addr(ip) => (*ip, None),
        Target::Name(name) => match forward(name).first() {
            Some(ip) => (*ip, Some(name.as_str())),
            None => return IdentityResult::unresolved(INVALID_ADDRESS),
        },
    };

    let hostname = match dns_lookup::lookup_addr(&ip) {
        // getnameinfo falls back to the numeric form when no PTR record exists.
        Ok(name) if name.parse::<IpAddr>().is_ok() => {
            debug!("{ip}: resolver echoed the address back");
            return IdentityResult::unresolved(NO_PTR_RECORD);
        }
        Ok(name) => name,
        Err(err) => {
            debug!("{ip}: reverse lookup failed: {err}");
            return IdentityResult::unresolved(NO_PTR_RECORD);
        }
    };

    let aliases = queried
        .filter(|q| !q.eq_ignore_ascii_case(&hostname))
        .map(|q| vec![q.to_string()])
        .unwrap_or_default();

    IdentityResult::Resolved {
        addresses: addresses_of(&hostname, ip),
        hostname: Some(hostname),
        aliases,
    }
}

fn forward(name: &str) -> Vec<IpAddr> {
    dns_lookup::lookup_host(name).unwrap_or_default()
}

/// Forward-confirms `hostname`, keeping only addresses of the queried family.
fn addresses_of(hostname: &str, ip: IpAddr) -> Vec<String> {
    let mut addrs: Vec<IpAddr> = Vec::new();
    for addr in forward(hostname) {
        if addr.is_ipv4() == ip.is_ipv4() && !addrs.contains(&addr) {
            addrs.push(addr);
        }
    }
    if addrs.is_empty() {
        addrs.push(ip);
    }
    addrs.iter().map(IpAddr::to_string).collect()
}
