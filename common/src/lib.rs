//! Shared building blocks for `hostsweep`.
//!
//! Everything that both the scan engine and the command line need lives here:
//! * **[`network`]**: target expressions, address ranges and local network lookup.
//! * **[`report`]**: the per-target records and the final scan report.
//! * **[`probe`]**: the traits the engine drives (reachability and identity).
//! * **[`config`]**: explicit scan and presentation settings.
//! * **[`error`]**: fatal, pre-scan errors.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod probe;
pub mod report;
pub mod signal;

#[doc(hidden)]
pub use tracing;
