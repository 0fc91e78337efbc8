//! Web page scrape checker

use std::collections::HashSet;

use regex::Regex;
use tracing::warn;

use crate::checker::error::CheckError;
use crate::checker::job::CheckerJob;
use crate::project::{HostKind, HostSpec, Project};
use crate::release::Release;

/// Checker for projects that publish releases on a plain web page.
///
/// Fetches the page and extracts version tokens with the project's pattern:
/// the first capture group when the pattern has one, the whole match
/// otherwise. Tokens keep page order and are deduplicated, a download page
/// usually mentions each version more than once.
pub struct ScrapeChecker {
    client: reqwest::Client,
}

impl ScrapeChecker {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("relwatch")
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for ScrapeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CheckerJob for ScrapeChecker {
    fn host_kind(&self) -> HostKind {
        HostKind::Scrape
    }

    async fn check(&self, project: &Project) -> Result<Vec<Release>, CheckError> {
        let HostSpec::Scrape { url, pattern } = &project.host else {
            return Err(CheckError::HostMismatch {
                identifier: project.identifier.clone(),
                expected: HostKind::Scrape,
                found: project.host_kind(),
            });
        };

        // Compile before fetching, a broken pattern should not cost a request
        let regex = Regex::new(pattern).map_err(|e| CheckError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CheckError::NotFound(project.identifier.clone()));
        }

        if !status.is_success() {
            warn!("Scrape target returned status {} for {}", status, url);
            return Err(CheckError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let body = response.text().await?;

        let mut seen = HashSet::new();
        let mut releases = Vec::new();
        for captures in regex.captures_iter(&body) {
            let version = match captures.get(1) {
                Some(group) => group.as_str(),
                None => &captures[0],
            };
            if seen.insert(version.to_string()) {
                releases.push(Release {
                    project: project.identifier.clone(),
                    version: version.to_string(),
                    published_at: None,
                    url: Some(url.clone()),
                });
            }
        }

        Ok(releases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrape_project(url: &str, pattern: &str) -> Project {
        Project {
            name: "SQLite".to_string(),
            identifier: "sqlite.org".to_string(),
            description: None,
            host: HostSpec::Scrape {
                url: url.to_string(),
                pattern: pattern.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn extracts_capture_group_in_page_order() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/download.html")
            .with_status(200)
            .with_body(
                r#"<html>
                    <a href="sqlite-3.46.0.tar.gz">sqlite-3.46.0.tar.gz</a>
                    <a href="sqlite-3.45.3.tar.gz">sqlite-3.45.3.tar.gz</a>
                    <a href="sqlite-3.45.2.tar.gz">sqlite-3.45.2.tar.gz</a>
                </html>"#,
            )
            .create_async()
            .await;

        let url = format!("{}/download.html", server.url());
        let project = scrape_project(&url, r"sqlite-(\d+\.\d+\.\d+)\.tar\.gz");

        let checker = ScrapeChecker::new();
        let releases = checker.check(&project).await.unwrap();

        assert_eq!(
            releases.iter().map(|r| r.version.as_str()).collect::<Vec<_>>(),
            vec!["3.46.0", "3.45.3", "3.45.2"]
        );
        assert!(releases.iter().all(|r| r.url.as_deref() == Some(url.as_str())));
    }

    #[tokio::test]
    async fn deduplicates_repeated_mentions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/download.html")
            .with_status(200)
            .with_body("release 2.1.0 is out! Download release 2.1.0 or the older 2.0.0 here")
            .create_async()
            .await;

        let url = format!("{}/download.html", server.url());
        let project = scrape_project(&url, r"(\d+\.\d+\.\d+)");

        let checker = ScrapeChecker::new();
        let releases = checker.check(&project).await.unwrap();

        assert_eq!(
            releases.iter().map(|r| r.version.as_str()).collect::<Vec<_>>(),
            vec!["2.1.0", "2.0.0"]
        );
    }

    #[tokio::test]
    async fn whole_match_is_used_without_a_capture_group() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/download.html")
            .with_status(200)
            .with_body("latest: v5.2, previous: v5.1")
            .create_async()
            .await;

        let url = format!("{}/download.html", server.url());
        let project = scrape_project(&url, r"v\d+\.\d+");

        let checker = ScrapeChecker::new();
        let releases = checker.check(&project).await.unwrap();

        assert_eq!(
            releases.iter().map(|r| r.version.as_str()).collect::<Vec<_>>(),
            vec!["v5.2", "v5.1"]
        );
    }

    #[tokio::test]
    async fn broken_pattern_fails_without_a_request() {
        let project = scrape_project("http://127.0.0.1:1/unreachable", "v(unclosed");

        let checker = ScrapeChecker::new();
        let result = checker.check(&project).await;

        assert!(matches!(
            result,
            Err(CheckError::InvalidPattern { pattern, .. }) if pattern == "v(unclosed"
        ));
    }

    #[tokio::test]
    async fn page_without_matches_yields_no_releases() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/download.html")
            .with_status(200)
            .with_body("<html>nothing to see</html>")
            .create_async()
            .await;

        let url = format!("{}/download.html", server.url());
        let project = scrape_project(&url, r"sqlite-(\d+\.\d+\.\d+)");

        let checker = ScrapeChecker::new();
        let releases = checker.check(&project).await.unwrap();

        assert!(releases.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_an_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/download.html")
            .with_status(503)
            .create_async()
            .await;

        let url = format!("{}/download.html", server.url());
        let project = scrape_project(&url, r"(\d+\.\d+)");

        let checker = ScrapeChecker::new();
        let result = checker.check(&project).await;

        assert!(matches!(result, Err(CheckError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn rejects_projects_from_other_hosts() {
        let project = Project {
            name: "left-pad".to_string(),
            identifier: "npm:left-pad".to_string(),
            description: None,
            host: HostSpec::Registry {
                package: "left-pad".to_string(),
            },
        };

        let checker = ScrapeChecker::new();
        let result = checker.check(&project).await;

        assert!(matches!(
            result,
            Err(CheckError::HostMismatch {
                expected: HostKind::Scrape,
                ..
            })
        ));
    }
}
