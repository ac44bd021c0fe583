//! The scan **orchestrator**.
//!
//! Fans the target list out to one task per target, never more than
//! `concurrency` at once, and fans the results back into a slot array indexed
//! by input position. Completion order therefore never leaks into the report.
//!
//! The run ends in one of three ways (see [`Completion`]):
//! * every target finished,
//! * the overall deadline elapsed,
//! * the [`StopSignal`] was raised.
//!
//! In the last two cases the in-flight tasks are aborted and every slot that is
//! still empty receives a placeholder record, so the report always holds exactly
//! one record per target. Blocking work that cannot be aborted (system resolver
//! calls) is left to finish on its own thread and its result is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use hostsweep_common::config::ScanConfig;
use hostsweep_common::network::target::Target;
use hostsweep_common::probe::{IdentityResolver, ReachabilityProbe};
use hostsweep_common::report::{Completion, ScanRecord, ScanReport};
use hostsweep_common::signal::StopSignal;
use hostsweep_common::{debug, info, success, warn};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

mod resolver;
mod worker;

pub use resolver::{DisabledResolver, SystemResolver};
use worker::TargetJob;

/// Called on the orchestrating task each time a target's record lands.
/// Receives the target's input index and its record.
pub type RecordCallback = Arc<dyn Fn(usize, &ScanRecord) + Send + Sync>;

pub struct Orchestrator {
    probe: Arc<dyn ReachabilityProbe>,
    resolver: Arc<dyn IdentityResolver>,
    cfg: ScanConfig,
    stop: StopSignal,
    on_record: Option<RecordCallback>,
}

impl Orchestrator {
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        resolver: Arc<dyn IdentityResolver>,
        cfg: ScanConfig,
    ) -> Self {
        Self {
            probe,
            resolver,
            cfg,
            stop: StopSignal::new(),
            on_record: None,
        }
    }

    /// Shares an externally controlled stop flag with this orchestrator.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn on_record(mut self, callback: RecordCallback) -> Self {
        self.on_record = Some(callback);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Probes and resolves a single target, outside of any scan bookkeeping.
    pub async fn scan_one(&self, target: Target) -> ScanRecord {
        self.job().run(target).await
    }

    /// Scans every target and returns one record per target, in input order.
    pub async fn run(&self, targets: Vec<Target>, source: Option<String>) -> ScanReport {
        let started_at = SystemTime::now();
        let clock = Instant::now();
        let total = targets.len();
        let concurrency = self.cfg.concurrency.max(1);
        // A deadline too far out to represent is no deadline at all.
        let deadline = self
            .cfg
            .overall_deadline
            .and_then(|d| tokio::time::Instant::now().checked_add(d));

        info!(
            "Scanning {total} target(s), up to {concurrency} at a time via {} / {}",
            self.probe.name(),
            self.resolver.name()
        );

        let limiter = Arc::new(Semaphore::new(concurrency));
        let mut slots: Vec<Option<ScanRecord>> = (0..total).map(|_| None).collect();
        let mut workers: JoinSet<(usize, ScanRecord)> = JoinSet::new();
        let mut in_flight: HashMap<task::Id, usize> = HashMap::new();
        let mut queue = targets.iter().enumerate().peekable();

        let completion = loop {
            if queue.peek().is_none() && workers.is_empty() {
                break Completion::Finished;
            }

            tokio::select! {
                biased;

                _ = self.stop.stopped() => break Completion::Cancelled,

                _ = wait_until(deadline) => break Completion::DeadlineExceeded,

                Some(joined) = workers.join_next_with_id(), if !workers.is_empty() => {
                    let (idx, record) = match joined {
                        Ok((id, (idx, record))) => {
                            in_flight.remove(&id);
                            (idx, record)
                        }
                        Err(err) => {
                            let Some(idx) = in_flight.remove(&err.id()) else {
                                continue;
                            };
                            warn!("Worker for {} failed: {err}", targets[idx]);
                            let reason = format!("worker failed: {err}");
                            (idx, ScanRecord::interrupted(targets[idx].clone(), &reason))
                        }
                    };
                    self.store(&mut slots, idx, record);
                }

                // FIFO: permits are only requested for the next target in input order.
                permit = limiter.clone().acquire_owned(), if queue.peek().is_some() => {
                    let Ok(permit) = permit else {
                        break Completion::Cancelled;
                    };
                    if let Some((idx, target)) = queue.next() {
                        let job = self.job();
                        let target = target.clone();
                        let handle = workers.spawn(async move {
                            let _permit = permit;
                            (idx, job.run(target).await)
                        });
                        in_flight.insert(handle.id(), idx);
                    }
                }
            }
        };

        if let Some(reason) = completion.pending_reason() {
            let pending = slots.iter().filter(|slot| slot.is_none()).count();
            warn!("Scan stopped early ({reason}), {pending} target(s) left unfinished");
            workers.abort_all();
        }
        drop(workers);

        let marker = completion.pending_reason().unwrap_or_default();
        let records: Vec<ScanRecord> = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, target)| slot.unwrap_or_else(|| ScanRecord::interrupted(target, marker)))
            .collect();

        let report = ScanReport {
            source,
            started_at,
            duration: clock.elapsed(),
            completion,
            records,
        };

        success!(
            "Scan finished in {:.2}s: {} active, {} inactive",
            report.duration.as_secs_f64(),
            report.active_count(),
            report.inactive_count()
        );
        report
    }

    fn job(&self) -> TargetJob {
        TargetJob {
            probe: self.probe.clone(),
            resolver: self.resolver.clone(),
            per_host_timeout: self.cfg.per_host_timeout,
            resolve_only_if_reachable: self.cfg.resolve_only_if_reachable,
        }
    }

    /// Each slot is written once; a second write would mean two tasks shared an index.
    fn store(&self, slots: &mut [Option<ScanRecord>], idx: usize, record: ScanRecord) {
        if slots[idx].is_some() {
            warn!("Duplicate result for target #{idx} ignored");
            return;
        }
        debug!("{} -> {}", record.target, record.status());
        if let Some(callback) = &self.on_record {
            callback(idx, &record);
        }
        slots[idx] = Some(record);
    }
}

/// Convenience wrapper for one-off scans without a stop signal or callback.
pub async fn run_scan(
    targets: Vec<Target>,
    cfg: &ScanConfig,
    probe: Arc<dyn ReachabilityProbe>,
    resolver: Arc<dyn IdentityResolver>,
) -> ScanReport {
    Orchestrator::new(probe, resolver, cfg.clone())
        .run(targets, None)
        .await
}

async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
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
