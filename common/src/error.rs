use thiserror::Error;

/// Errors that stop a scan before any network activity happens.
///
/// Per-target failures never show up here; they are recorded inside the
/// [`ScanRecord`](crate::report::ScanRecord) of the target that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("range expands to {requested} addresses, above the limit of {max}")]
    RangeTooLarge { requested: u64, max: u64 },

    #[error("invalid target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("no local network available: {0}")]
    NoLocalNetwork(String),
}

impl ScanError {
    pub(crate) fn invalid_range(input: &str, reason: impl ToString) -> Self {
        Self::InvalidRange {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_target(input: &str, reason: impl ToString) -> Self {
        Self::InvalidTarget {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
