//! Per-host release checkers
//!
//! Each checker implements [`CheckerJob`] for one host family and turns the
//! host's own listing format into plain [`crate::release::Release`] values.
//! Checkers fetch complete lists; deciding what is new is the cycle layer's
//! job.
//!
//! # Modules
//!
//! - [`job`]: the `CheckerJob` trait
//! - [`error`]: failure taxonomy shared by all checkers
//! - [`github`]: GitHub releases API
//! - [`registry`]: npm-style package registries
//! - [`scrape`]: pattern extraction from plain web pages

pub mod error;
pub mod github;
pub mod job;
pub mod registry;
pub mod scrape;

pub use error::CheckError;
pub use github::GithubChecker;
pub use job::CheckerJob;
pub use registry::RegistryChecker;
pub use scrape::ScrapeChecker;

use std::sync::Arc;

use crate::config::HostsConfig;

/// Builds the checker set enabled by the configuration.
///
/// A disabled host family gets no checker; projects pointing at it fail
/// their checks as a configuration error instead of being silently skipped.
pub fn checkers_from_config(config: &HostsConfig) -> Vec<Arc<dyn CheckerJob>> {
    let mut checkers: Vec<Arc<dyn CheckerJob>> = Vec::new();

    if config.github.enabled {
        let base_url = config
            .github
            .base_url
            .as_deref()
            .unwrap_or(github::DEFAULT_BASE_URL);
        let mut checker = GithubChecker::new(base_url);
        if let Some(token) = &config.github.token {
            checker = checker.with_token(token.clone());
        }
        checkers.push(Arc::new(checker));
    }

    if config.registry.enabled {
        let base_url = config
            .registry
            .base_url
            .as_deref()
            .unwrap_or(registry::DEFAULT_BASE_URL);
        checkers.push(Arc::new(RegistryChecker::new(base_url)));
    }

    if config.scrape.enabled {
        checkers.push(Arc::new(ScrapeChecker::new()));
    }

    checkers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HostsConfig, ScrapeHostConfig};
    use crate::project::HostKind;

    fn kinds(checkers: &[Arc<dyn CheckerJob>]) -> Vec<HostKind> {
        checkers.iter().map(|c| c.host_kind()).collect()
    }

    #[test]
    fn default_config_enables_every_host_family() {
        let checkers = checkers_from_config(&HostsConfig::default());

        assert_eq!(
            kinds(&checkers),
            vec![HostKind::Github, HostKind::Registry, HostKind::Scrape]
        );
    }

    #[test]
    fn disabled_host_family_gets_no_checker() {
        let config = HostsConfig {
            scrape: ScrapeHostConfig { enabled: false },
            ..HostsConfig::default()
        };

        let checkers = checkers_from_config(&config);

        assert!(!kinds(&checkers).contains(&HostKind::Scrape));
        assert_eq!(checkers.len(), 2);
    }
}
