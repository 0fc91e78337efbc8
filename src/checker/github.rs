//! GitHub releases API checker

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::checker::error::CheckError;
use crate::checker::job::CheckerJob;
use crate::project::{HostKind, HostSpec, Project};
use crate::release::Release;

/// Default base URL for the GitHub API
pub(crate) const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// One entry of the releases listing
#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    html_url: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    draft: bool,
}

/// Checker for projects hosted on GitHub or a GitHub-compatible instance.
///
/// Lists releases through `GET /repos/{owner}/{repo}/releases`. Draft
/// entries are skipped: they are visible to repository collaborators but
/// not published.
pub struct GithubChecker {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubChecker {
    /// Creates a new GithubChecker with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("relwatch")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            token: None,
        }
    }

    /// Sets a bearer token for authenticated calls (higher rate limits,
    /// private repositories).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for GithubChecker {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Primary rate limits answer with 403 and an exhausted quota header
fn rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response.status() == reqwest::StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

#[async_trait::async_trait]
impl CheckerJob for GithubChecker {
    fn host_kind(&self) -> HostKind {
        HostKind::Github
    }

    async fn check(&self, project: &Project) -> Result<Vec<Release>, CheckError> {
        let HostSpec::Github { owner, repo } = &project.host else {
            return Err(CheckError::HostMismatch {
                identifier: project.identifier.clone(),
                expected: HostKind::Github,
                found: project.host_kind(),
            });
        };

        let url = format!(
            "{}/repos/{}/{}/releases?per_page=100",
            self.base_url, owner, repo
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CheckError::NotFound(project.identifier.clone()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || rate_limit_exhausted(&response) {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(CheckError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {} for {}", status, url);
            return Err(CheckError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let listing: Vec<GithubRelease> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            CheckError::InvalidResponse(e.to_string())
        })?;

        let releases = listing
            .into_iter()
            .filter(|entry| !entry.draft)
            .map(|entry| Release {
                project: project.identifier.clone(),
                version: entry.tag_name,
                published_at: entry.published_at,
                url: Some(entry.html_url),
            })
            .collect();

        Ok(releases)
    }
}
