//! The `hostsweep` scan engine.
//!
//! * **[`scanner`]**: bounded, cancellable fan-out of probe and lookup work per target.
//! * **[`network`]**: concrete reachability probes.
//! * **[`export`]**: CSV persistence of finished reports.
//! * **[`discovery`]**: the embedding surface tying the above together.

pub mod discovery;
pub mod export;
pub mod network;
pub mod scanner;

pub use discovery::{ListScan, Scanner};
pub use export::{CsvSink, ExportError, ResultSink};
pub use network::{PingProbe, TcpHandshakeProbe};
pub use scanner::{DisabledResolver, Orchestrator, SystemResolver, run_scan};
