//! Cycle orchestration

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::checker::{CheckError, CheckerJob};
use crate::config::CycleConfig;
use crate::cycle::diff::new_releases;
use crate::cycle::report::{CheckOutcome, CycleReport};
use crate::cycle::retry::RetryPolicy;
use crate::metrics::MonitorMetrics;
use crate::notify::NotificationSink;
use crate::project::{HostKind, Project};
use crate::release::Release;
use crate::store::ReleaseStore;

/// Drives one checking cycle over the configured projects.
///
/// Projects are independent: they run concurrently under the in-flight
/// bound, and one project's failure never touches another. Per project the
/// order is fixed: fetch, diff, persist, notify. The store write commits
/// before the sink is invoked, so a crash can lose a notification but never
/// repeat one.
pub struct CycleRunner<S> {
    checkers: HashMap<HostKind, Arc<dyn CheckerJob>>,
    store: Arc<S>,
    sink: Arc<dyn NotificationSink>,
    policy: RetryPolicy,
    check_deadline: Duration,
    limiter: Arc<Semaphore>,
    metrics: Arc<MonitorMetrics>,
}

impl<S: ReleaseStore> CycleRunner<S> {
    /// Creates a runner from the enabled checkers, keyed by the host kind
    /// each checker declares for itself.
    pub fn new(
        checkers: Vec<Arc<dyn CheckerJob>>,
        store: Arc<S>,
        sink: Arc<dyn NotificationSink>,
        config: &CycleConfig,
    ) -> Self {
        let checkers = checkers
            .into_iter()
            .map(|checker| (checker.host_kind(), checker))
            .collect();

        Self {
            checkers,
            store,
            sink,
            policy: RetryPolicy::new(
                config.retry_attempts,
                Duration::from_millis(config.retry_backoff_ms),
            ),
            check_deadline: Duration::from_millis(config.check_deadline_ms),
            limiter: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            metrics: Arc::new(MonitorMetrics::default()),
        }
    }

    /// Counters accumulated across cycles, for an external reporter.
    pub fn metrics(&self) -> Arc<MonitorMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Runs one full cycle and reports per-project outcomes in input order.
    pub async fn run_cycle(&self, projects: &[Project]) -> CycleReport {
        debug!("Starting cycle over {} projects", projects.len());

        let outcomes = join_all(projects.iter().map(|project| async move {
            // The semaphore is never closed, acquire cannot fail
            let _permit = self.limiter.acquire().await.expect("semaphore closed");
            let outcome = self.check_project(project).await;
            (project.identifier.clone(), outcome)
        }))
        .await;

        let report = CycleReport { outcomes };
        info!("Cycle finished: {}", report.summary());
        report
    }

    async fn check_project(&self, project: &Project) -> CheckOutcome {
        self.metrics.record_check_attempted();

        let kind = project.host_kind();
        let Some(checker) = self.checkers.get(&kind) else {
            error!(
                "No checker configured for host kind '{}' (project '{}')",
                kind, project.identifier
            );
            self.metrics.record_permanent_failure();
            return CheckOutcome::FailedPermanent;
        };

        let fetched = match self.fetch_with_retry(checker.as_ref(), project).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_transient() => {
                warn!(
                    "Check failed for '{}', deferring to next cycle: {}",
                    project.identifier, e
                );
                self.metrics.record_transient_failure();
                return CheckOutcome::FailedTransient;
            }
            Err(e) => {
                error!("Check failed permanently for '{}': {}", project.identifier, e);
                self.metrics.record_permanent_failure();
                return CheckOutcome::FailedPermanent;
            }
        };

        // A host listing zero releases is a valid answer, not a failure
        if fetched.is_empty() {
            debug!("Host lists no releases for '{}'", project.identifier);
            return CheckOutcome::NoChange;
        }

        let seen = match self.store.seen_versions(&project.identifier) {
            Ok(seen) => seen,
            Err(e) => {
                warn!("Store read failed for '{}': {}", project.identifier, e);
                self.metrics.record_store_error();
                return CheckOutcome::FailedTransient;
            }
        };

        let new = new_releases(&fetched, &seen);
        if new.is_empty() {
            debug!("No new releases for '{}'", project.identifier);
            return CheckOutcome::NoChange;
        }

        // Persist before notifying: a crash between the two loses a
        // notification instead of repeating it on the next cycle. The full
        // fetched batch is recorded so metadata for seen versions stays
        // current too.
        if let Err(e) = self.store.record_releases(&project.identifier, &fetched) {
            warn!(
                "Store write failed for '{}', holding back {} new releases: {}",
                project.identifier,
                new.len(),
                e
            );
            self.metrics.record_store_error();
            return CheckOutcome::FailedTransient;
        }

        info!(
            "Found {} new releases for '{}'",
            new.len(),
            project.identifier
        );
        self.metrics.record_new_releases(new.len() as u64);
        self.sink.notify(project, &new).await;

        CheckOutcome::Reported(new.len())
    }

    async fn fetch_with_retry(
        &self,
        checker: &dyn CheckerJob,
        project: &Project,
    ) -> Result<Vec<Release>, CheckError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(checker, project).await {
                Ok(releases) => return Ok(releases),
                Err(e) if e.is_transient() && attempt < self.policy.attempts => {
                    let delay = self.policy.delay_after(attempt);
                    debug!(
                        "Attempt {}/{} for '{}' failed ({}), retrying in {:?}",
                        attempt, self.policy.attempts, project.identifier, e, delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(
        &self,
        checker: &dyn CheckerJob,
        project: &Project,
    ) -> Result<Vec<Release>, CheckError> {
        timeout(self.check_deadline, checker.check(project))
            .await
            .unwrap_or(Err(CheckError::DeadlineExceeded(self.check_deadline)))
    }
}
