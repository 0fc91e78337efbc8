use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::project::Project;

// =============================================================================
// Tuning constants
// =============================================================================

/// Default interval between cycles in watch mode (1 hour)
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60 * 60;

/// Deadline for a single check attempt in milliseconds (30 seconds)
pub const DEFAULT_CHECK_DEADLINE_MS: u64 = 30_000;

/// Attempts per project per cycle, first try included
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Base backoff between attempts in milliseconds, doubling per failure
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Upper bound on concurrently running checks
pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Monitor configuration document
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub cycle: CycleConfig,
    pub hosts: HostsConfig,
}

impl MonitorConfig {
    /// Reads a configuration file; missing sections fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Orchestration tuning
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CycleConfig {
    /// Upper bound on concurrently running checks
    pub max_in_flight: usize,
    /// Attempts per project per cycle, first try included
    pub retry_attempts: u32,
    /// Base backoff between attempts, doubling per failed attempt
    pub retry_backoff_ms: u64,
    /// Deadline for a single check attempt
    pub check_deadline_ms: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            check_deadline_ms: DEFAULT_CHECK_DEADLINE_MS,
        }
    }
}

/// Per-host-family configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct HostsConfig {
    pub github: GithubHostConfig,
    pub registry: RegistryHostConfig,
    pub scrape: ScrapeHostConfig,
}

/// GitHub host family configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GithubHostConfig {
    pub enabled: bool,
    /// Override for GitHub-compatible instances
    pub base_url: Option<String>,
    /// Bearer token for higher rate limits
    pub token: Option<String>,
}

impl Default for GithubHostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            token: None,
        }
    }
}

/// Package registry host family configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryHostConfig {
    pub enabled: bool,
    /// Override for npm-compatible registries
    pub base_url: Option<String>,
}

impl Default for RegistryHostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

/// Scrape host family configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrapeHostConfig {
    pub enabled: bool,
}

impl Default for ScrapeHostConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Projects file: the list of tracked projects
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProjectsFile {
    pub projects: Vec<Project>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Project '{0}' has an empty identifier")]
    EmptyIdentifier(String),

    #[error("Duplicate project identifier: {0}")]
    DuplicateIdentifier(String),
}

/// Loads the projects file, enforcing globally unique identifiers.
pub fn load_projects(path: &Path) -> Result<Vec<Project>, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    parse_projects(&raw)
}

fn parse_projects(raw: &str) -> Result<Vec<Project>, ConfigError> {
    let file: ProjectsFile = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for project in &file.projects {
        if project.identifier.is_empty() {
            return Err(ConfigError::EmptyIdentifier(project.name.clone()));
        }
        if !seen.insert(project.identifier.as_str()) {
            return Err(ConfigError::DuplicateIdentifier(project.identifier.clone()));
        }
    }

    Ok(file.projects)
}

/// Returns the path to the data directory for relwatch.
/// Uses $XDG_DATA_HOME/relwatch if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/relwatch,
/// or ./relwatch if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the release database file.
pub fn db_path() -> PathBuf {
    data_dir().join("releases.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("relwatch.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("relwatch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::HostSpec;
    use serde_json::json;

    #[test]
    fn monitor_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<MonitorConfig>(json!({
            "cycle": {
                "maxInFlight": 2
            }
        }))
        .unwrap();

        assert_eq!(result.cycle.max_in_flight, 2);
        assert_eq!(result.cycle.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
        assert_eq!(result.hosts, HostsConfig::default());
    }

    #[test]
    fn monitor_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<MonitorConfig>(json!({
            "cycle": {
                "maxInFlight": 4,
                "retryAttempts": 2,
                "retryBackoffMs": 250,
                "checkDeadlineMs": 10000
            },
            "hosts": {
                "github": {
                    "enabled": true,
                    "baseUrl": "https://github.example.com/api/v3",
                    "token": "ghp_secret"
                },
                "registry": { "enabled": false },
                "scrape": { "enabled": false }
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            MonitorConfig {
                cycle: CycleConfig {
                    max_in_flight: 4,
                    retry_attempts: 2,
                    retry_backoff_ms: 250,
                    check_deadline_ms: 10000,
                },
                hosts: HostsConfig {
                    github: GithubHostConfig {
                        enabled: true,
                        base_url: Some("https://github.example.com/api/v3".to_string()),
                        token: Some("ghp_secret".to_string()),
                    },
                    registry: RegistryHostConfig {
                        enabled: false,
                        base_url: None,
                    },
                    scrape: ScrapeHostConfig { enabled: false },
                }
            }
        );
    }

    #[test]
    fn parse_projects_accepts_every_host_kind() {
        let projects = parse_projects(
            r#"{
                "projects": [
                    {
                        "name": "Tokio",
                        "identifier": "tokio-rs/tokio",
                        "host": { "kind": "github", "owner": "tokio-rs", "repo": "tokio" }
                    },
                    {
                        "name": "left-pad",
                        "identifier": "npm:left-pad",
                        "description": "String padding",
                        "host": { "kind": "registry", "package": "left-pad" }
                    },
                    {
                        "name": "SQLite",
                        "identifier": "sqlite.org",
                        "host": {
                            "kind": "scrape",
                            "url": "https://sqlite.org/download.html",
                            "pattern": "sqlite-(\\d+\\.\\d+\\.\\d+)"
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(projects.len(), 3);
        assert_eq!(projects[0].identifier, "tokio-rs/tokio");
        assert!(matches!(projects[2].host, HostSpec::Scrape { .. }));
    }

    #[test]
    fn parse_projects_rejects_duplicate_identifiers() {
        let result = parse_projects(
            r#"{
                "projects": [
                    {
                        "name": "Tokio",
                        "identifier": "tokio-rs/tokio",
                        "host": { "kind": "github", "owner": "tokio-rs", "repo": "tokio" }
                    },
                    {
                        "name": "Tokio again",
                        "identifier": "tokio-rs/tokio",
                        "host": { "kind": "github", "owner": "tokio-rs", "repo": "tokio" }
                    }
                ]
            }"#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::DuplicateIdentifier(id)) if id == "tokio-rs/tokio"
        ));
    }

    #[test]
    fn parse_projects_rejects_empty_identifiers() {
        let result = parse_projects(
            r#"{
                "projects": [
                    {
                        "name": "Nameless",
                        "identifier": "",
                        "host": { "kind": "registry", "package": "nameless" }
                    }
                ]
            }"#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::EmptyIdentifier(name)) if name == "Nameless"
        ));
    }

    #[test]
    fn load_projects_round_trips_through_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(
            &path,
            r#"{
                "projects": [
                    {
                        "name": "left-pad",
                        "identifier": "npm:left-pad",
                        "host": { "kind": "registry", "package": "left-pad" }
                    }
                ]
            }"#,
        )
        .unwrap();

        let projects = load_projects(&path).unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "left-pad");
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/relwatch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(path, PathBuf::from("/home/user/.local/share/relwatch"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./relwatch"));
    }
}
