//! Cycle counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Plain counters accumulated across cycles.
///
/// The core only counts; shipping the numbers to a metrics transport is the
/// caller's concern. Counters never reset.
#[derive(Debug, Default)]
pub struct MonitorMetrics {
    checks_attempted: AtomicU64,
    transient_failures: AtomicU64,
    permanent_failures: AtomicU64,
    store_errors: AtomicU64,
    new_releases: AtomicU64,
}

impl MonitorMetrics {
    pub fn record_check_attempted(&self) {
        self.checks_attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transient_failure(&self) {
        self.transient_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_permanent_failure(&self) {
        self.permanent_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_new_releases(&self, count: u64) {
        self.new_releases.fetch_add(count, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            checks_attempted: self.checks_attempted.load(Ordering::Relaxed),
            transient_failures: self.transient_failures.load(Ordering::Relaxed),
            permanent_failures: self.permanent_failures.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            new_releases: self.new_releases.load(Ordering::Relaxed),
        }
    }
}

/// Plain-value view of [`MonitorMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub checks_attempted: u64,
    pub transient_failures: u64,
    pub permanent_failures: u64,
    pub store_errors: u64,
    pub new_releases: u64,
}
