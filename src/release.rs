//! Release value type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One published release of a tracked project, as reported by its host.
///
/// Immutable once constructed. The `(project, version)` pair is the
/// uniqueness key everywhere: store rows, diffing, notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Identifier of the owning project (relation, not ownership).
    pub project: String,
    /// Host-defined version token, e.g. "v1.2.3" or "2024-05". Hosts are not
    /// required to follow semver.
    pub version: String,
    /// Publication timestamp, when the host provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Link to release notes or to the page the release was found on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Release {
    /// Creates a release with no timestamp and no URL.
    pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
            published_at: None,
            url: None,
        }
    }

    /// Sets the publication timestamp.
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Sets the release URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
