//! Seen-release persistence
//!
//! The store remembers which versions have already been observed for each
//! project, keyed by the project identifier. Writes are additive: versions
//! accumulate and the core never deletes them, so a version reported once
//! is never reported again.

pub mod sqlite;

pub use sqlite::SqliteStore;

#[cfg(test)]
use mockall::automock;

use std::collections::HashSet;

use thiserror::Error;

use crate::release::Release;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Per-project seen-release state.
///
/// Both operations must be safe to call concurrently for distinct
/// identifiers, and a single identifier's read-modify-write must behave as
/// if serialized.
#[cfg_attr(test, automock)]
pub trait ReleaseStore: Send + Sync + 'static {
    /// All versions ever recorded for `identifier`. Empty set when the
    /// project has never completed a check.
    fn seen_versions(&self, identifier: &str) -> Result<HashSet<String>, StoreError>;

    /// Records `releases` under `identifier`, atomically for the whole
    /// batch. Versions already present keep their original row (union
    /// write, nothing is overwritten or removed).
    fn record_releases(&self, identifier: &str, releases: &[Release]) -> Result<(), StoreError>;
}
