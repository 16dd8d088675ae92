//! Aggregated results of a run.

use super::{ExampleResult, Verdict};

/// Verdict counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Examples that passed.
    pub passed: usize,
    /// Examples whose assertions failed.
    pub failed: usize,
    /// Pending or skipped examples.
    pub pending: usize,
    /// Examples that hit an unexpected error.
    pub errored: usize,
}

impl Summary {
    /// Total number of executed examples.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.pending + self.errored
    }
}

/// Results of one [`crate::Runner::run`] invocation, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    results: Vec<ExampleResult>,
    aborted: bool,
}

impl RunReport {
    pub(crate) const fn new(results: Vec<ExampleResult>, aborted: bool) -> Self {
        Self { results, aborted }
    }

    /// Per-example results.
    #[must_use]
    pub fn results(&self) -> &[ExampleResult] {
        &self.results
    }

    /// `(fully qualified description, verdict, optional message)` tuples.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &Verdict, Option<String>)> {
        self.results
            .iter()
            .map(|result| (result.description(), result.verdict(), result.message()))
    }

    /// Returns `true` when the run stopped before every selected example ran.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns `true` when no example failed or errored.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self
            .results
            .iter()
            .any(|result| result.verdict().is_failure())
    }

    /// Verdict counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.results
            .iter()
            .fold(Summary::default(), |mut summary, result| {
                match result.verdict() {
                    Verdict::Passed => summary.passed += 1,
                    Verdict::Failed(_) => summary.failed += 1,
                    Verdict::Pending(_) => summary.pending += 1,
                    Verdict::Errored(_) => summary.errored += 1,
                }
                summary
            })
    }

    /// Looks up the result for a fully qualified description.
    #[must_use]
    pub fn find(&self, description: &str) -> Option<&ExampleResult> {
        self.results
            .iter()
            .find(|result| result.description() == description)
    }
}
