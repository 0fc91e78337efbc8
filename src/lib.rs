//! relwatch keeps an eye on software projects hosted on external platforms
//! and reports newly published releases.
//!
//! One pass of [`cycle::runner::CycleRunner::run_cycle`] checks every
//! configured [`project::Project`] concurrently: the checker matching the
//! project's host fetches its current release list, the cycle diffs the
//! list against the versions recorded in the [`store::ReleaseStore`],
//! persists anything new and hands the new releases to a
//! [`notify::NotificationSink`].
//!
//! # Modules
//!
//! - [`project`] / [`release`]: the tracked-project and release data model
//! - [`checker`]: per-host fetch strategies (GitHub, package registries, scraping)
//! - [`cycle`]: orchestration, diffing, retry policy and cycle reports
//! - [`store`]: seen-release persistence (SQLite)
//! - [`notify`]: notification delivery seam
//! - [`metrics`]: plain counters for external reporters
//! - [`config`]: configuration documents and file loading

pub mod checker;
pub mod config;
pub mod cycle;
pub mod metrics;
pub mod notify;
pub mod project;
pub mod release;
pub mod store;
