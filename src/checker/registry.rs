//! npm-style package registry checker

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::checker::error::CheckError;
use crate::checker::job::CheckerJob;
use crate::project::{HostKind, HostSpec, Project};
use crate::release::Release;

/// Default base URL for the npm registry
pub(crate) const DEFAULT_BASE_URL: &str = "https://registry.npmjs.org";

/// Package metadata document of an npm-style registry.
///
/// `versions` keeps document order: registries append on publish, so the
/// document order doubles as the host-defined release order.
#[derive(Debug, Deserialize)]
struct PackageDocument {
    versions: IndexMap<String, serde_json::Value>,
    /// Publication timestamps keyed by version. npm also stores "created"
    /// and "modified" under this key; those never collide with a version.
    #[serde(default)]
    time: HashMap<String, DateTime<Utc>>,
}

/// Checker for packages published to an npm-style registry.
pub struct RegistryChecker {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryChecker {
    /// Creates a new RegistryChecker with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("relwatch")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    /// Scoped package names keep their `@` but escape the slash
    fn encode_package_name(name: &str) -> String {
        name.replace('/', "%2F")
    }
}

impl Default for RegistryChecker {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl CheckerJob for RegistryChecker {
    fn host_kind(&self) -> HostKind {
        HostKind::Registry
    }

    async fn check(&self, project: &Project) -> Result<Vec<Release>, CheckError> {
        let HostSpec::Registry { package } = &project.host else {
            return Err(CheckError::HostMismatch {
                identifier: project.identifier.clone(),
                expected: HostKind::Registry,
                found: project.host_kind(),
            });
        };

        let url = format!("{}/{}", self.base_url, Self::encode_package_name(package));
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CheckError::NotFound(project.identifier.clone()));
        }

        if !status.is_success() {
            warn!("Registry returned status {} for {}", status, url);
            return Err(CheckError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let document: PackageDocument = response.json().await.map_err(|e| {
            warn!("Failed to parse registry response for {}: {}", package, e);
            CheckError::InvalidResponse(e.to_string())
        })?;

        let releases = document
            .versions
            .into_keys()
            .map(|version| Release {
                project: project.identifier.clone(),
                published_at: document.time.get(&version).copied(),
                version,
                url: None,
            })
            .collect();

        Ok(releases)
    }
}
