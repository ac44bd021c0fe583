//! Logging macros shared by every crate in the workspace.
//!
//! They are thin wrappers over `tracing` so library code does not need to know
//! how the binary renders events. The targets below are recognised by the
//! terminal formatter.

/// Target used for successful milestones, rendered with a distinct marker.
pub const SUCCESS_TARGET: &str = "hostsweep::success";

/// Target used for raw terminal output that must be printed as-is.
pub const PRINT_TARGET: &str = "hostsweep::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "hostsweep::success", $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}
