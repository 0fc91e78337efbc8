//! Checker contract

#[cfg(test)]
use mockall::automock;

use crate::checker::error::CheckError;
use crate::project::{HostKind, Project};
use crate::release::Release;

/// Fetch strategy for one family of hosts.
///
/// A checker is stateless with respect to projects: it receives the project
/// on every call and holds only host-level state (HTTP client, base URL,
/// credentials).
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait CheckerJob: Send + Sync {
    /// The host family this checker can talk to.
    fn host_kind(&self) -> HostKind;

    /// Fetches the complete current release list for a project.
    ///
    /// # Arguments
    /// * `project` - Must carry this checker's host kind; any other kind is
    ///   a configuration error and fails without retry
    ///
    /// # Returns
    /// * `Ok(releases)` - Everything the host currently lists, in the host's
    ///   order, not just releases that are new
    /// * `Err(error)` - Classified by [`CheckError::is_transient`] to decide
    ///   retry eligibility
    async fn check(&self, project: &Project) -> Result<Vec<Release>, CheckError>;
}
