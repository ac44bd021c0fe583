//! Per-target results and the scan report that carries them.
//!
//! Every failure a single target can run into is a value here rather than an
//! error: an unreachable host, a broken probe or a missing PTR record all end
//! up inside the target's [`ScanRecord`].

use std::fmt;
use std::time::{Duration, SystemTime};

use crate::network::target::Target;

/// Reason recorded when an address has no reverse mapping.
pub const NO_PTR_RECORD: &str = "No PTR record found";
/// Reason recorded when a target could not be turned into an address at all.
pub const INVALID_ADDRESS: &str = "Invalid IP address";
/// Placeholder reason for targets still pending when the scan deadline hit.
pub const DEADLINE_EXCEEDED: &str = "scan deadline exceeded";
/// Placeholder reason for targets still pending when the scan was stopped.
pub const SCAN_CANCELLED: &str = "scan cancelled";
/// Identity marker used when lookups are limited to reachable hosts.
pub const SKIPPED_UNREACHABLE: &str = "lookup skipped: host unreachable";
/// Reason recorded when the probe did not return within the per-host budget.
pub const PROBE_TIMED_OUT: &str = "probe timed out";
/// Reason recorded when the lookup did not return within the per-host budget.
pub const LOOKUP_TIMED_OUT: &str = "lookup timed out";
/// Reason recorded when reverse lookups are switched off.
pub const DNS_DISABLED: &str = "DNS lookup disabled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachabilityOutcome {
    Reachable,
    Unreachable,
    /// The probe itself could not run (missing tool, missing permission, ...).
    ProbeError(String),
}

impl ReachabilityOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ReachabilityOutcome::Reachable)
    }

    pub fn status(&self) -> Status {
        if self.is_reachable() {
            Status::Active
        } else {
            Status::Inactive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResult {
    Resolved {
        hostname: Option<String>,
        aliases: Vec<String>,
        addresses: Vec<String>,
    },
    Unresolved {
        reason: String,
    },
}

impl IdentityResult {
    pub fn unresolved(reason: impl Into<String>) -> Self {
        IdentityResult::Unresolved {
            reason: reason.into(),
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            IdentityResult::Resolved { hostname, .. } => hostname.as_deref(),
            IdentityResult::Unresolved { .. } => None,
        }
    }

    pub fn aliases(&self) -> &[String] {
        match self {
            IdentityResult::Resolved { aliases, .. } => aliases,
            IdentityResult::Unresolved { .. } => &[],
        }
    }

    pub fn addresses(&self) -> &[String] {
        match self {
            IdentityResult::Resolved { addresses, .. } => addresses,
            IdentityResult::Unresolved { .. } => &[],
        }
    }

    /// The failure reason, if the lookup did not succeed.
    pub fn error(&self) -> Option<&str> {
        match self {
            IdentityResult::Resolved { .. } => None,
            IdentityResult::Unresolved { reason } => Some(reason),
        }
    }
}

/// The aggregated outcome for one target. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub target: Target,
    pub reachability: ReachabilityOutcome,
    pub identity: IdentityResult,
}

impl ScanRecord {
    pub fn new(target: Target, reachability: ReachabilityOutcome, identity: IdentityResult) -> Self {
        Self {
            target,
            reachability,
            identity,
        }
    }

    /// Placeholder for a target whose work never completed.
    pub fn interrupted(target: Target, reason: &str) -> Self {
        Self::new(
            target,
            ReachabilityOutcome::ProbeError(reason.to_string()),
            IdentityResult::unresolved(reason),
        )
    }

    pub fn status(&self) -> Status {
        self.reachability.status()
    }

    pub fn is_active(&self) -> bool {
        self.status() == Status::Active
    }
}

/// How a scan came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Every target produced its own record.
    Finished,
    /// The overall deadline elapsed; pending targets carry [`DEADLINE_EXCEEDED`].
    DeadlineExceeded,
    /// The scan was stopped from outside; pending targets carry [`SCAN_CANCELLED`].
    Cancelled,
}

impl Completion {
    /// The reason stamped on targets that had not finished.
    pub fn pending_reason(&self) -> Option<&'static str> {
        match self {
            Completion::Finished => None,
            Completion::DeadlineExceeded => Some(DEADLINE_EXCEEDED),
            Completion::Cancelled => Some(SCAN_CANCELLED),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    /// What was scanned, as the user wrote it (e.g. `192.168.1.0/24`).
    pub source: Option<String>,
    pub started_at: SystemTime,
    pub duration: Duration,
    pub completion: Completion,
    /// One record per input target, in input order.
    pub records: Vec<ScanRecord>,
}

impl ScanReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_active()).count()
    }

    pub fn inactive_count(&self) -> usize {
        self.len() - self.active_count()
    }

    pub fn is_complete(&self) -> bool {
        self.completion == Completion::Finished
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
