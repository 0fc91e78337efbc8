//! Notification delivery seam

#[cfg(test)]
use mockall::automock;

use tracing::info;

use crate::project::Project;
use crate::release::Release;

/// Receives newly discovered releases.
///
/// The orchestrator calls a sink at most once per release discovery, after
/// the discovery has been persisted. Delivery is best-effort: a sink owns
/// its own retries and error reporting.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, project: &Project, releases: &[Release]);
}

/// Sink that reports releases to the log. The binary's default.
pub struct LogSink;

#[async_trait::async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, project: &Project, releases: &[Release]) {
        for release in releases {
            match &release.url {
                Some(url) => info!(
                    "New release for {} ({}): {} <{}>",
                    project.name, project.identifier, release.version, url
                ),
                None => info!(
                    "New release for {} ({}): {}",
                    project.name, project.identifier, release.version
                ),
            }
        }
    }
}
