//! Shared state threaded through the behavioural scenarios.

use std::sync::Arc;

use nestspec::{RunReport, Suite};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use test_helpers::CallLog;

/// What a scenario has built and observed so far.
#[derive(Default, ScenarioState)]
pub struct SpecWorld {
    /// Events recorded by hooks, bindings and bodies.
    pub log: Slot<CallLog>,
    /// The assembled suite under test.
    pub suite: Slot<Arc<Suite>>,
    /// Rendered build error when assembly failed.
    pub build_error: Slot<String>,
    /// Report of the last run.
    pub report: Slot<RunReport>,
}

impl SpecWorld {
    /// Returns the scenario's call log, creating it on first use.
    pub fn call_log(&self) -> CallLog {
        if self.log.is_empty() {
            self.log.set(CallLog::new());
        }
        self.log.with_ref(Clone::clone).unwrap_or_default()
    }
}

/// Fresh scenario state.
#[fixture]
pub fn spec_world() -> SpecWorld {
    SpecWorld::default()
}
