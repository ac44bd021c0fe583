//! # Host Discovery Service
//!
//! The embedding surface of the engine. A [`Scanner`] owns the two
//! collaborators, the scan settings and a result sink, and exposes the four
//! operations a caller needs:
//!
//! 1. **Expand** a range into targets.
//! 2. **Scan** a single host.
//! 3. **Run** a host list, optionally exporting the report.
//! 4. **Export** records that were collected elsewhere.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hostsweep_common::config::ScanConfig;
use hostsweep_common::error::ScanError;
use hostsweep_common::network::range;
use hostsweep_common::network::target::{Target, TargetSpec};
use hostsweep_common::probe::{IdentityResolver, ReachabilityProbe};
use hostsweep_common::report::{ScanRecord, ScanReport};
use hostsweep_common::signal::StopSignal;

use crate::export::{CsvSink, ExportError, ResultSink};
use crate::scanner::{Orchestrator, RecordCallback};

/// Outcome of [`Scanner::run_list`].
///
/// The report is always present. A failed export does not discard it.
#[derive(Debug)]
pub struct ListScan {
    pub report: ScanReport,
    /// `None` when exporting was not requested.
    pub export: Option<Result<PathBuf, ExportError>>,
}

impl ListScan {
    pub fn exported_to(&self) -> Option<&Path> {
        match &self.export {
            Some(Ok(path)) => Some(path),
            _ => None,
        }
    }
}

pub struct Scanner {
    orchestrator: Orchestrator,
    sink: Box<dyn ResultSink>,
}

impl Scanner {
    pub fn new(
        probe: Arc<dyn ReachabilityProbe>,
        resolver: Arc<dyn IdentityResolver>,
        cfg: ScanConfig,
    ) -> Self {
        Self {
            orchestrator: Orchestrator::new(probe, resolver, cfg),
            sink: Box::new(CsvSink::new()),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.orchestrator = self.orchestrator.with_stop_signal(stop);
        self
    }

    pub fn on_record(mut self, callback: RecordCallback) -> Self {
        self.orchestrator = self.orchestrator.on_record(callback);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        self.orchestrator.config()
    }

    /// Every address of a CIDR block, network and broadcast included, ascending.
    pub fn expand(&self, range: &str) -> Result<Vec<Target>, ScanError> {
        range::cidr_to_targets(range, self.config().max_targets)
    }

    /// Expands any accepted target expression under the same size guard.
    pub fn expand_spec(&self, spec: &TargetSpec) -> Result<Vec<Target>, ScanError> {
        spec.to_targets(self.config().max_targets)
    }

    pub async fn scan_host(&self, target: Target) -> ScanRecord {
        self.orchestrator.scan_one(target).await
    }

    /// Scans `hosts` and, when `export` is set, writes the report through the sink.
    ///
    /// `destination` is only consulted when exporting. Without one the sink
    /// picks a timestamped file name.
    pub async fn run_list(
        &self,
        hosts: Vec<Target>,
        export: bool,
        destination: Option<&Path>,
    ) -> ListScan {
        self.run_labelled(hosts, None, export, destination).await
    }

    /// Like [`run_list`](Self::run_list), recording `spec` as the report's source.
    pub async fn run_spec(
        &self,
        spec: &TargetSpec,
        export: bool,
        destination: Option<&Path>,
    ) -> Result<ListScan, ScanError> {
        let hosts = self.expand_spec(spec)?;
        Ok(self
            .run_labelled(hosts, Some(spec.to_string()), export, destination)
            .await)
    }

    pub fn export(
        &self,
        records: &[ScanRecord],
        destination: Option<&Path>,
    ) -> Result<PathBuf, ExportError> {
        self.sink.write(records, destination)
    }

    async fn run_labelled(
        &self,
        hosts: Vec<Target>,
        source: Option<String>,
        export: bool,
        destination: Option<&Path>,
    ) -> ListScan {
        let report = self.orchestrator.run(hosts, source).await;

        let export = export.then(|| {
            let written = self.export(&report.records, destination);
            if let Err(e) = &written {
                hostsweep_common::error!("Export failed: {e}");
            }
            written
        });

        ListScan { report, export }
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
