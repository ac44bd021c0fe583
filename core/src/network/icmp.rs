use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use hostsweep_common::debug;
use hostsweep_common::network::target::Target;
use hostsweep_common::probe::ReachabilityProbe;
use hostsweep_common::report::ReachabilityOutcome;
use tokio::process::Command;
use tokio::time::timeout;

/// One ICMP echo request, sent by the platform's `ping` binary.
///
/// Exit status 0 means a reply arrived. Anything else is an unreachable host,
/// unless `ping` itself could not run.
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
}

impl Default for PingProbe {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
        }
    }
}

impl PingProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a different executable, e.g. an absolute path to `ping`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, host: &str, budget: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(ping_args(host, budget))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ReachabilityProbe for PingProbe {
    async fn probe(&self, target: &Target, budget: Duration) -> ReachabilityOutcome {
        let host = target.to_string();
        let child = match self.command(&host, budget).spawn() {
            Ok(child) => child,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
                return ReachabilityOutcome::ProbeError(format!("cannot run {}: {e}", self.program));
            }
            Err(e) => return ReachabilityOutcome::ProbeError(e.to_string()),
        };

        // `ping` rounds its own wait up to whole seconds on some platforms.
        let output = match timeout(budget, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return ReachabilityOutcome::ProbeError(e.to_string()),
            Err(_elapsed) => return ReachabilityOutcome::Unreachable,
        };

        if output.status.success() {
            return ReachabilityOutcome::Reachable;
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_permission_failure(&stderr) {
            return ReachabilityOutcome::ProbeError(stderr.trim().to_string());
        }
        debug!("ping {host} exited with {}", output.status);
        ReachabilityOutcome::Unreachable
    }

    fn name(&self) -> &'static str {
        "icmp-ping"
    }
}

#[cfg_attr(target_os = "windows", allow(dead_code))]
fn wait_secs(budget: Duration) -> u64 {
    budget.as_millis().div_ceil(1000).max(1) as u64
}

#[cfg(target_os = "windows")]
fn ping_args(host: &str, budget: Duration) -> Vec<String> {
    let millis = budget.as_millis().max(1);
    vec!["-n".into(), "1".into(), "-w".into(), millis.to_string(), host.into()]
}

#[cfg(target_os = "macos")]
fn ping_args(host: &str, budget: Duration) -> Vec<String> {
    // macOS takes -W in milliseconds and -t as an overall limit in seconds.
    let millis = budget.as_millis().max(1);
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        millis.to_string(),
        "-t".into(),
        wait_secs(budget).to_string(),
        host.into(),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn ping_args(host: &str, budget: Duration) -> Vec<String> {
    vec![
        "-c".into(),
        "1".into(),
        "-W".into(),
        wait_secs(budget).to_string(),
        host.into(),
    ]
}

fn is_permission_failure(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("not permitted") || lower.contains("permission denied")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
