//! Shared fixtures for cycle-level tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use relwatch::checker::{CheckError, CheckerJob};
use relwatch::notify::NotificationSink;
use relwatch::project::{HostKind, HostSpec, Project};
use relwatch::release::Release;
use relwatch::store::SqliteStore;

/// Checker that serves scripted release lists per identifier. Unscripted
/// identifiers behave like projects the host does not know.
#[allow(dead_code)]
pub struct StaticChecker {
    kind: HostKind,
    releases: HashMap<String, Vec<Release>>,
}

#[allow(dead_code)]
impl StaticChecker {
    pub fn new(kind: HostKind) -> Self {
        Self {
            kind,
            releases: HashMap::new(),
        }
    }

    pub fn with_releases(mut self, identifier: &str, versions: &[&str]) -> Self {
        let releases = versions
            .iter()
            .map(|version| Release::new(identifier, *version))
            .collect();
        self.releases.insert(identifier.to_string(), releases);
        self
    }
}

#[async_trait]
impl CheckerJob for StaticChecker {
    fn host_kind(&self) -> HostKind {
        self.kind
    }

    async fn check(&self, project: &Project) -> Result<Vec<Release>, CheckError> {
        match self.releases.get(&project.identifier) {
            Some(releases) => Ok(releases.clone()),
            None => Err(CheckError::NotFound(project.identifier.clone())),
        }
    }
}

/// Sink that records every notification it receives
#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<(String, Vec<Release>)>>,
}

impl RecordingSink {
    pub fn notified(&self) -> Vec<(String, Vec<Release>)> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, project: &Project, releases: &[Release]) {
        self.notifications
            .lock()
            .unwrap()
            .push((project.identifier.clone(), releases.to_vec()));
    }
}

/// Creates a store on a throwaway database file. Keep the TempDir alive for
/// the duration of the test.
pub fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::new(&db_path).unwrap();
    (temp_dir, Arc::new(store))
}

/// Project hosted on GitHub, identifier doubling as owner/repo
pub fn github_project(identifier: &str) -> Project {
    let (owner, repo) = identifier.split_once('/').unwrap_or((identifier, "repo"));
    Project {
        name: identifier.to_string(),
        identifier: identifier.to_string(),
        description: None,
        host: HostSpec::Github {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
    }
}
