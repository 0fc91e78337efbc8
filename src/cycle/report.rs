//! Per-cycle outcome report

use std::fmt;

/// What happened to one project during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// New releases were found, persisted and handed to the sink
    Reported(usize),
    /// Check succeeded, nothing new
    NoChange,
    /// Gave up for this cycle; the project stays eligible for the next one
    FailedTransient,
    /// Needs an operator fix, retrying cannot help
    FailedPermanent,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOutcome::Reported(n) => write!(f, "{n} new releases"),
            CheckOutcome::NoChange => f.write_str("no change"),
            CheckOutcome::FailedTransient => f.write_str("failed (will retry next cycle)"),
            CheckOutcome::FailedPermanent => f.write_str("failed (needs configuration fix)"),
        }
    }
}

/// Aggregated result of one full cycle, one entry per project in input
/// order.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<(String, CheckOutcome)>,
}

impl CycleReport {
    pub fn outcome_for(&self, identifier: &str) -> Option<&CheckOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, outcome)| outcome)
    }

    /// Total new releases reported across all projects.
    pub fn new_release_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                CheckOutcome::Reported(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| {
                matches!(
                    outcome,
                    CheckOutcome::FailedTransient | CheckOutcome::FailedPermanent
                )
            })
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// One-line summary for cycle logs.
    pub fn summary(&self) -> String {
        format!(
            "{} projects checked, {} new releases, {} failures",
            self.outcomes.len(),
            self.new_release_count(),
            self.failure_count()
        )
    }
}
