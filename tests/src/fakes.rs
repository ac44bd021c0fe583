//! Deterministic stand-ins for the network-facing collaborators.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hostsweep_common::network::target::Target;
use hostsweep_common::probe::{IdentityResolver, ReachabilityProbe};
use hostsweep_common::report::{IdentityResult, NO_PTR_RECORD, ReachabilityOutcome};

/// Tracks how many calls are running at once and the highest value seen.
#[derive(Debug, Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Answers from a script keyed by address. Unknown targets are unreachable.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    answers: HashMap<IpAddr, ReachabilityOutcome>,
    delays: HashMap<IpAddr, Duration>,
    panics: HashSet<IpAddr>,
    order: Mutex<Vec<IpAddr>>,
    pub gauge: Gauge,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, ip: &str, outcome: ReachabilityOutcome) -> Self {
        self.answers.insert(parse(ip), outcome);
        self
    }

    pub fn delay(mut self, ip: IpAddr, delay: Duration) -> Self {
        self.delays.insert(ip, delay);
        self
    }

    /// The probe task for `ip` panics instead of answering.
    pub fn panic_on(mut self, ip: &str) -> Self {
        self.panics.insert(parse(ip));
        self
    }

    /// Addresses in the order the probe was called for them.
    pub fn call_order(&self) -> Vec<IpAddr> {
        self.order.lock().map(|order| order.clone()).unwrap_or_default()
    }

    /// Reachable when `pred` holds for the address.
    pub fn reachable_if(mut self, targets: &[Target], pred: impl Fn(IpAddr) -> bool) -> Self {
        for ip in targets.iter().filter_map(Target::ip) {
            let outcome = if pred(ip) {
                ReachabilityOutcome::Reachable
            } else {
                ReachabilityOutcome::Unreachable
            };
            self.answers.insert(ip, outcome);
        }
        self
    }
}

#[async_trait]
impl ReachabilityProbe for ScriptedProbe {
    async fn probe(&self, target: &Target, _timeout: Duration) -> ReachabilityOutcome {
        self.gauge.enter();
        let ip = target.ip();
        if let (Some(ip), Ok(mut order)) = (ip, self.order.lock()) {
            order.push(ip);
        }
        if let Some(ip) = ip.filter(|ip| self.panics.contains(ip)) {
            panic!("scripted failure for {ip}");
        }
        if let Some(delay) = ip.and_then(|ip| self.delays.get(&ip)) {
            tokio::time::sleep(*delay).await;
        }
        self.gauge.leave();

        ip.and_then(|ip| self.answers.get(&ip).cloned())
            .unwrap_or(ReachabilityOutcome::Unreachable)
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Resolves from a script keyed by address. Unknown targets have no PTR record.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    names: HashMap<IpAddr, IdentityResult>,
    delay: Duration,
    pub gauge: Gauge,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_of(mut self, ip: &str, hostname: &str) -> Self {
        self.names.insert(
            parse(ip),
            IdentityResult::Resolved {
                hostname: Some(hostname.to_string()),
                aliases: Vec::new(),
                addresses: vec![ip.to_string()],
            },
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl IdentityResolver for ScriptedResolver {
    async fn resolve(&self, target: &Target, _timeout: Duration) -> IdentityResult {
        self.gauge.enter();
        tokio::time::sleep(self.delay).await;
        self.gauge.leave();

        target
            .ip()
            .and_then(|ip| self.names.get(&ip).cloned())
            .unwrap_or_else(|| IdentityResult::unresolved(NO_PTR_RECORD))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Reproducible pseudo-random delays in `0..max_ms` milliseconds.
pub fn jitter(seed: u64, count: usize, max_ms: u64) -> Vec<Duration> {
    let mut state = seed.max(1);
    (0..count)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            Duration::from_millis(state % max_ms.max(1))
        })
        .collect()
}

pub fn hosts(prefix: [u8; 3], count: u8) -> Vec<Target> {
    (1..=count)
        .map(|d| Target::from(Ipv4Addr::new(prefix[0], prefix[1], prefix[2], d)))
        .collect()
}

fn parse(ip: &str) -> IpAddr {
    ip.parse().unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
