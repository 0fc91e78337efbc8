//! Tracked-project data model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The host family a project lives on. Selects which checker knows how to
/// talk to the host. Fixed for the lifetime of a project; re-hosting means
/// removing the project and adding it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKind {
    /// GitHub releases API (or a compatible instance)
    Github,
    /// npm-style package registry
    Registry,
    /// Plain web page scraped with a version pattern
    Scrape,
}

impl HostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostKind::Github => "github",
            HostKind::Registry => "registry",
            HostKind::Scrape => "scrape",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(HostKind::Github),
            "registry" => Ok(HostKind::Registry),
            "scrape" => Ok(HostKind::Scrape),
            other => Err(format!("unknown host kind: {other}")),
        }
    }
}

/// Host-specific addressing for a project. Only the checker matching the
/// variant's kind ever looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostSpec {
    /// Repository on GitHub, addressed as owner/repo
    Github { owner: String, repo: String },
    /// Package on an npm-style registry
    Registry { package: String },
    /// Arbitrary page plus a regex whose first capture group (or whole
    /// match) yields version tokens
    Scrape { url: String, pattern: String },
}

impl HostSpec {
    pub fn kind(&self) -> HostKind {
        match self {
            HostSpec::Github { .. } => HostKind::Github,
            HostSpec::Registry { .. } => HostKind::Registry,
            HostSpec::Scrape { .. } => HostKind::Scrape,
        }
    }
}

/// A software project tracked on some external host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Human-readable label for logs and notifications
    pub name: String,
    /// Stable key for store lookups and reporting, unique across the
    /// configured project set, e.g. "tokio-rs/tokio" or a canonical URL
    pub identifier: String,
    /// Not every host provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the project lives and how to address it there
    pub host: HostSpec,
}

impl Project {
    pub fn host_kind(&self) -> HostKind {
        self.host.kind()
    }
}
