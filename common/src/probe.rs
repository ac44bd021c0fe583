//! The two collaborators the scan engine drives for every target.
//!
//! The engine only depends on these traits. Concrete implementations talk to
//! the operating system (`ping`, the system resolver); tests plug in scripted
//! fakes instead.

use std::time::Duration;

use async_trait::async_trait;

use crate::network::target::Target;
use crate::report::{IdentityResult, ReachabilityOutcome};

/// Answers "is this host alive?" with a single bounded attempt.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Must return within roughly `timeout`. A host that does not answer is
    /// [`ReachabilityOutcome::Unreachable`], not an error.
    async fn probe(&self, target: &Target, timeout: Duration) -> ReachabilityOutcome;

    /// Return a human-readable name for this probe
    fn name(&self) -> &'static str;
}

/// Maps a target back to its host name, aliases and addresses.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Lookup failures, including a missing PTR record, are reported as
    /// [`IdentityResult::Unresolved`].
    async fn resolve(&self, target: &Target, timeout: Duration) -> IdentityResult;

    fn name(&self) -> &'static str;
}
