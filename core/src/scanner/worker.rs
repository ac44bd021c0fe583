use std::sync::Arc;
use std::time::Duration;

use hostsweep_common::network::target::Target;
use hostsweep_common::probe::{IdentityResolver, ReachabilityProbe};
use hostsweep_common::report::{
    IdentityResult, LOOKUP_TIMED_OUT, PROBE_TIMED_OUT, ReachabilityOutcome, SKIPPED_UNREACHABLE,
    ScanRecord,
};
use tokio::time::timeout;

/// Slack on top of the per-host budget before the engine gives up on a
/// collaborator that ignores its own timeout.
const GRACE: Duration = Duration::from_millis(250);

/// Everything one target needs; cheap to clone into a task.
#[derive(Clone)]
pub(crate) struct TargetJob {
    pub probe: Arc<dyn ReachabilityProbe>,
    pub resolver: Arc<dyn IdentityResolver>,
    pub per_host_timeout: Duration,
    pub resolve_only_if_reachable: bool,
}

impl TargetJob {
    pub async fn run(self, target: Target) -> ScanRecord {
        if self.resolve_only_if_reachable {
            let reachability = self.probe(&target).await;
            let identity = if reachability.is_reachable() {
                self.resolve(&target).await
            } else {
                IdentityResult::unresolved(SKIPPED_UNREACHABLE)
            };
            return ScanRecord::new(target, reachability, identity);
        }

        let (reachability, identity) = tokio::join!(self.probe(&target), self.resolve(&target));
        ScanRecord::new(target, reachability, identity)
    }

    async fn probe(&self, target: &Target) -> ReachabilityOutcome {
        let budget = self.per_host_timeout;
        match timeout(budget.saturating_add(GRACE), self.probe.probe(target, budget)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => ReachabilityOutcome::ProbeError(PROBE_TIMED_OUT.to_string()),
        }
    }

    async fn resolve(&self, target: &Target) -> IdentityResult {
        let budget = self.per_host_timeout;
        match timeout(budget.saturating_add(GRACE), self.resolver.resolve(target, budget)).await {
            Ok(identity) => identity,
            Err(_elapsed) => IdentityResult::unresolved(LOOKUP_TIMED_OUT),
        }
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
