use std::time::Duration;

/// Maximum number of targets in flight when nothing else is configured.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Budget for a single probe or a single lookup.
pub const DEFAULT_HOST_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Largest target list a single expression may expand into (a /16).
pub const DEFAULT_MAX_TARGETS: u64 = 65_536;

/// Settings consumed by the scan engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on targets being probed at the same time. Never below 1.
    pub concurrency: usize,

    /// Applied separately to the reachability probe and to the identity lookup.
    ///
    /// Collaborators receive this budget and are expected to honour it. The
    /// engine itself only cuts a call off 250ms after the budget has run out,
    /// so a misbehaving probe or resolver can overshoot by that much.
    pub per_host_timeout: Duration,

    /// Whole-scan deadline. Targets not finished by then are marked, not dropped.
    pub overall_deadline: Option<Duration>,

    /// Skip identity resolution for targets that did not answer the probe.
    pub resolve_only_if_reachable: bool,

    /// Guard against expanding huge ranges such as `0.0.0.0/0`.
    pub max_targets: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            per_host_timeout: DEFAULT_HOST_TIMEOUT,
            overall_deadline: None,
            resolve_only_if_reachable: false,
            max_targets: DEFAULT_MAX_TARGETS,
        }
    }
}

impl ScanConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_per_host_timeout(mut self, timeout: Duration) -> Self {
        self.per_host_timeout = timeout;
        self
    }

    pub fn with_overall_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.overall_deadline = deadline;
        self
    }

    pub fn with_resolve_only_if_reachable(mut self, enabled: bool) -> Self {
        self.resolve_only_if_reachable = enabled;
        self
    }

    pub fn with_max_targets(mut self, max_targets: u64) -> Self {
        self.max_targets = max_targets;
        self
    }
}

/// Presentation settings for the command line front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub no_banner: bool,
    /// Replace reverse lookups with a resolver that marks every identity as disabled.
    pub no_dns: bool,
    /// 0 prints everything, 1 drops decorations, 2 prints only the summary.
    pub quiet: u8,
    /// Do not capture the keyboard for early stop.
    pub disable_input: bool,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
