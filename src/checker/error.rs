//! Check failure taxonomy

use std::time::Duration;

use thiserror::Error;

use crate::project::HostKind;

/// Failure modes of a single check attempt.
///
/// [`CheckError::is_transient`] is the contract the retry loop and the cycle
/// report build on: transient failures may be retried and leave the project
/// eligible for the next cycle, permanent ones need an operator fix.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Project '{identifier}' is hosted on {found}, this checker handles {expected}")]
    HostMismatch {
        identifier: String,
        expected: HostKind,
        found: HostKind,
    },

    #[error("Invalid version pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Project not found on host: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Check timed out after {0:?}")]
    DeadlineExceeded(Duration),
}

impl CheckError {
    /// True for failures that may heal on a later attempt. Mismatched host
    /// kinds, unparseable patterns and unknown projects are configuration
    /// problems and are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            CheckError::Network(_)
            | CheckError::RateLimited { .. }
            | CheckError::InvalidResponse(_)
            | CheckError::DeadlineExceeded(_) => true,
            CheckError::HostMismatch { .. }
            | CheckError::InvalidPattern { .. }
            | CheckError::NotFound(_) => false,
        }
    }
}
