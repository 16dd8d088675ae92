//! Executes selected examples.
//!
//! Every example gets a fresh [`ExampleContext`]. Before hooks run root
//! first and stop at the first failure, the body runs only when setup
//! completed, and every after hook of the chain runs innermost first no
//! matter what happened before it. Panics are caught and classified, so one
//! example can never take down its siblings.

mod report;
mod verdict;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, info, info_span, warn};

pub use report::{RunReport, Summary};
pub use verdict::{ErroredCause, ExampleResult, HookFailure, HookPhase, Verdict};

use crate::config::RunConfig;
use crate::tree::{Action, Hook};
use crate::{ExampleContext, Failure, GroupId, Outcome, Selected, Suite};
pub(crate) use verdict::{is_assertion_panic, panic_message};

/// Stops a run from another thread or from inside an example.
///
/// Examples that have not started when the handle fires are omitted from the
/// report; the example in progress completes, including its after hooks.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Requests that the run stop before the next example.
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`Self::abort`] has been called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs examples and collects their verdicts.
///
/// A body that returns [`Failure::Assertion`] (see [`crate::check`]) or
/// panics from `assert_eq!`/`assert_ne!`/bare `assert!` is `Failed`. A
/// custom-message `assert!(cond, "...")` panics with that message alone and
/// is reported as `Errored`, like any other panic.
///
/// ```rust
/// use nestspec::{Failure, Runner, Suite, Verdict, select};
///
/// let mut builder = Suite::builder();
/// builder.describe("Queue", |queue| {
///     queue.it("fails", |_| Err(Failure::assertion("boom")));
///     queue.it("is never reached", |_| Ok(()));
/// });
/// let suite = builder.build()?;
/// let report = Runner::new().fail_fast(true).run(&suite, &select(&suite, &[]));
/// assert_eq!(report.results().len(), 1);
/// assert_eq!(report.results()[0].verdict(), &Verdict::Failed("boom".into()));
/// assert!(report.is_aborted());
/// # Ok::<_, nestspec::BuildError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Runner {
    fail_fast: bool,
    jobs: usize,
    abort: AbortHandle,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
            abort: AbortHandle::default(),
        }
    }
}

impl Runner {
    /// Creates a sequential runner that never stops early.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner honouring the execution settings of `config`.
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new().fail_fast(config.fail_fast).jobs(config.jobs)
    }

    /// Stops the run after the first failed or errored example.
    #[must_use]
    pub const fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Number of worker threads; distinct top-level groups run in parallel
    /// when greater than one. Zero is treated as one.
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Handle that stops this runner early.
    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Runs `selection` against `suite`.
    ///
    /// Results come back in selection order regardless of the number of
    /// workers.
    #[must_use]
    pub fn run(&self, suite: &Suite, selection: &[Selected]) -> RunReport {
        let span = info_span!("run", examples = selection.len(), jobs = self.jobs);
        let _entered = span.enter();

        let batches = batches_by_root(selection);
        let results = if self.jobs > 1 && batches.len() > 1 {
            self.run_parallel(suite, &batches)
        } else {
            batches
                .iter()
                .flat_map(|batch| batch.iter())
                .map_while(|&(index, selected)| self.step(suite, index, selected))
                .collect()
        };
        let mut ordered: Vec<(usize, ExampleResult)> = results;
        ordered.sort_by_key(|(index, _)| *index);

        let aborted = ordered.len() < selection.len();
        let report = RunReport::new(
            ordered.into_iter().map(|(_, result)| result).collect(),
            aborted,
        );
        let summary = report.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            pending = summary.pending,
            errored = summary.errored,
            aborted,
            "run finished"
        );
        report
    }

    fn run_parallel(
        &self,
        suite: &Suite,
        batches: &[Vec<(usize, &Selected)>],
    ) -> Vec<(usize, ExampleResult)> {
        let next = AtomicUsize::new(0);
        let workers = self.jobs.min(batches.len());
        debug!(workers, groups = batches.len(), "running top-level groups in parallel");
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                handles.push(scope.spawn(|| self.drain(suite, batches, &next)));
            }
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        })
    }

    /// Worker loop: claims whole top-level groups until none are left.
    fn drain(
        &self,
        suite: &Suite,
        batches: &[Vec<(usize, &Selected)>],
        next: &AtomicUsize,
    ) -> Vec<(usize, ExampleResult)> {
        let mut results = Vec::new();
        while let Some(batch) = batches.get(next.fetch_add(1, Ordering::SeqCst)) {
            for &(index, selected) in batch {
                match self.step(suite, index, selected) {
                    Some(result) => results.push(result),
                    None => return results,
                }
            }
        }
        results
    }

    /// Runs one example unless the run was aborted.
    fn step(
        &self,
        suite: &Suite,
        index: usize,
        selected: &Selected,
    ) -> Option<(usize, ExampleResult)> {
        if self.abort.is_aborted() {
            return None;
        }
        let result = execute(suite, selected);
        if self.fail_fast && result.verdict().is_failure() {
            debug!(example = result.description(), "fail fast triggered");
            self.abort.abort();
        }
        Some((index, result))
    }
}

/// Groups the selection by top-level group, preserving first-seen order.
fn batches_by_root(selection: &[Selected]) -> Vec<Vec<(usize, &Selected)>> {
    let mut roots: Vec<Option<GroupId>> = Vec::new();
    let mut batches: Vec<Vec<(usize, &Selected)>> = Vec::new();
    for (index, selected) in selection.iter().enumerate() {
        let root = selected.root();
        let slot = roots
            .iter()
            .position(|known| *known == root)
            .unwrap_or_else(|| {
                roots.push(root);
                batches.push(Vec::new());
                batches.len() - 1
            });
        if let Some(batch) = batches.get_mut(slot) {
            batch.push((index, selected));
        }
    }
    batches
}

fn execute(suite: &Suite, selected: &Selected) -> ExampleResult {
    let example = suite.example(selected.example());
    let description = suite.full_description(example.id());
    let span = info_span!("example", example = %description);
    let _entered = span.enter();

    let mut result = ExampleResult {
        example: example.id(),
        description,
        location: example.location().clone(),
        verdict: Verdict::Passed,
        cleanup_failures: Vec::new(),
    };
    let body = match (example.pending_reason(), example.body()) {
        (None, Some(body)) => body,
        (reason, _) => {
            let text = reason.unwrap_or("not yet implemented");
            result.verdict = Verdict::Pending(text.to_owned());
            debug!(verdict = "pending", reason = text, "example not run");
            return result;
        }
    };

    let ctx = ExampleContext::new(suite, example.id(), selected.chain());
    let primary = match run_before_hooks(suite, &ctx) {
        Ok(()) => run_body(&ctx, body),
        Err(verdict) => verdict,
    };
    let cleanup = run_after_hooks(suite, &ctx);
    for failure in &cleanup {
        warn!(
            group = %failure.group,
            location = %failure.location,
            message = %failure.message,
            "cleanup hook failed"
        );
    }
    result.verdict = primary.with_cleanup(&cleanup);
    result.cleanup_failures = cleanup;
    debug!(verdict = result.verdict.label(), "example finished");
    result
}

/// Outcome of a guarded call: its own result, or the message of the panic
/// that interrupted it.
fn guarded<F>(action: F) -> Result<Outcome, String>
where
    F: FnOnce() -> Outcome,
{
    panic::catch_unwind(AssertUnwindSafe(action)).map_err(|payload| panic_message(payload.as_ref()))
}

fn run_before_hooks(suite: &Suite, ctx: &ExampleContext<'_>) -> Result<(), Verdict> {
    for &id in ctx.chain() {
        let group = suite.group(id);
        for hook in group.before_hooks() {
            let message = match guarded(|| hook.call(ctx)) {
                Ok(Ok(())) => continue,
                Ok(Err(Failure::Pending(reason))) => return Err(Verdict::Pending(reason)),
                Ok(Err(failure)) => failure.to_string(),
                Err(panicked) => panicked,
            };
            let failure = hook_failure(HookPhase::Before, group.description(), hook, message);
            debug!(%failure, "setup aborted");
            return Err(Verdict::Errored(ErroredCause::Hook(failure)));
        }
    }
    Ok(())
}

fn run_body(ctx: &ExampleContext<'_>, body: &Action) -> Verdict {
    match panic::catch_unwind(AssertUnwindSafe(|| body(ctx))) {
        Ok(outcome) => Verdict::from_body(outcome),
        Err(payload) => Verdict::from_panic(payload.as_ref()),
    }
}

fn run_after_hooks(suite: &Suite, ctx: &ExampleContext<'_>) -> Vec<HookFailure> {
    let mut failures = Vec::new();
    for &id in ctx.chain().iter().rev() {
        let group = suite.group(id);
        for hook in group.after_hooks() {
            let message = match guarded(|| hook.call(ctx)) {
                Ok(Ok(())) => continue,
                Ok(Err(failure)) => failure.to_string(),
                Err(panicked) => panicked,
            };
            failures.push(hook_failure(
                HookPhase::After,
                group.description(),
                hook,
                message,
            ));
        }
    }
    failures
}

fn hook_failure(phase: HookPhase, group: &str, hook: &Hook, message: String) -> HookFailure {
    HookFailure {
        phase,
        group: group.to_owned(),
        location: hook.location().clone(),
        message,
    }
}

#[cfg(test)]
mod tests;
