//! Unit tests for verdict classification and example execution.
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface unexpected verdicts"
)]

use rstest::rstest;
use test_helpers::CallLog;

use super::{ErroredCause, HookFailure, HookPhase, Runner, Verdict, batches_by_root};
use crate::{Failure, SourceLocation, Suite, select};

fn cleanup_failure() -> HookFailure {
    HookFailure {
        phase: HookPhase::After,
        group: String::from("Account"),
        location: SourceLocation::new("specs/account.rs", 7, 9),
        message: String::from("teardown exploded"),
    }
}

#[rstest]
#[case("assertion `left == right` failed", true)]
#[case("assertion failed: balance > 0", true)]
#[case("index out of bounds", false)]
fn panics_are_classified_by_message(#[case] message: &'static str, #[case] assertion: bool) {
    let verdict = Verdict::from_panic(&message);
    assert_eq!(matches!(verdict, Verdict::Failed(_)), assertion);
    assert_eq!(verdict.message().as_deref(), Some(message));
}

#[rstest]
fn owned_panic_payloads_keep_their_message() {
    let payload = String::from("called `Option::unwrap()` on a `None` value");
    let verdict = Verdict::from_panic(&payload);
    assert_eq!(
        verdict,
        Verdict::Errored(ErroredCause::UnexpectedException(payload))
    );
}

#[rstest]
#[case(Ok(()), "passed")]
#[case(Err(Failure::assertion("nope")), "failed")]
#[case(Err(Failure::pending("later")), "pending")]
#[case(Err(Failure::message("boom")), "errored")]
fn body_outcomes_map_to_verdicts(#[case] outcome: crate::Outcome, #[case] label: &str) {
    assert_eq!(Verdict::from_body(outcome).label(), label);
}

#[rstest]
fn cleanup_failures_only_demote_passing_examples() {
    let failures = [cleanup_failure()];
    assert_eq!(
        Verdict::Passed.with_cleanup(&failures),
        Verdict::Errored(ErroredCause::Hook(cleanup_failure()))
    );
    let failed = Verdict::Failed(String::from("primary"));
    assert_eq!(failed.clone().with_cleanup(&failures), failed);
    let pending = Verdict::Pending(String::from("later"));
    assert_eq!(pending.clone().with_cleanup(&failures), pending);
    assert_eq!(Verdict::Passed.with_cleanup(&[]), Verdict::Passed);
}

#[rstest]
fn hook_failures_render_their_origin() {
    assert_eq!(
        cleanup_failure().to_string(),
        "after hook of 'Account' (specs/account.rs:7) failed: teardown exploded"
    );
}

#[rstest]
fn batches_follow_first_appearance_of_each_root() {
    let mut builder = Suite::builder();
    builder.describe("First", |first| {
        first.it("one", |_| Ok(()));
        first.context("nested", |nested| {
            nested.it("two", |_| Ok(()));
        });
    });
    builder.describe("Second", |second| {
        second.it("three", |_| Ok(()));
    });
    let suite = builder.build().expect("build suite");
    let selection = select(&suite, &[]);
    let batches = batches_by_root(&selection);
    let indices: Vec<Vec<usize>> = batches
        .iter()
        .map(|batch| batch.iter().map(|(index, _)| *index).collect())
        .collect();
    assert_eq!(indices, vec![vec![0, 1], vec![2]]);
}

#[rstest]
fn hooks_wrap_the_body_in_nesting_order() {
    let log = CallLog::new();
    let mut builder = Suite::builder();
    let (outer_before, outer_after) = (log.clone(), log.clone());
    let (inner_before, inner_after, body) = (log.clone(), log.clone(), log.clone());
    builder.describe("Outer", move |outer| {
        outer.before(move |_| {
            outer_before.record("before outer");
            Ok(())
        });
        outer.after(move |_| {
            outer_after.record("after outer");
            Ok(())
        });
        outer.context("inner", move |inner| {
            inner.before(move |_| {
                inner_before.record("before inner");
                Ok(())
            });
            inner.after(move |_| {
                inner_after.record("after inner");
                Ok(())
            });
            inner.it("runs", move |_| {
                body.record("body");
                Ok(())
            });
        });
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert!(report.is_success());
    assert_eq!(
        log.entries(),
        [
            "before outer",
            "before inner",
            "body",
            "after inner",
            "after outer"
        ]
    );
}

#[rstest]
fn failing_setup_skips_the_body_but_not_cleanup() {
    let log = CallLog::new();
    let (body, cleanup) = (log.clone(), log.clone());
    let mut builder = Suite::builder();
    builder.describe("Setup", move |group| {
        group.before(|_| Err(Failure::message("database unavailable")));
        group.after(move |_| {
            cleanup.record("after");
            Ok(())
        });
        group.it("never runs", move |_| {
            body.record("body");
            Ok(())
        });
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert_eq!(log.entries(), ["after"]);
    let result = &report.results()[0];
    match result.verdict() {
        Verdict::Errored(ErroredCause::Hook(failure)) => {
            assert_eq!(failure.phase, HookPhase::Before);
            assert_eq!(failure.group, "Setup");
            assert_eq!(failure.message, "database unavailable");
        }
        other => panic!("expected a setup failure, got {other:?}"),
    }
}

#[rstest]
fn panicking_cleanup_is_recorded_and_later_hooks_still_run() {
    let log = CallLog::new();
    let outer = log.clone();
    let mut builder = Suite::builder();
    builder.describe("Outer", move |group| {
        group.after(move |_| {
            outer.record("after outer");
            Ok(())
        });
        group.context("inner", |inner| {
            inner.after(|_| panic!("socket already closed"));
            inner.it("passes", |_| Ok(()));
        });
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert_eq!(log.entries(), ["after outer"]);
    let result = &report.results()[0];
    assert_eq!(result.cleanup_failures().len(), 1);
    assert_eq!(result.cleanup_failures()[0].message, "socket already closed");
    assert!(matches!(
        result.verdict(),
        Verdict::Errored(ErroredCause::Hook(HookFailure {
            phase: HookPhase::After,
            ..
        }))
    ));
}

#[rstest]
fn pending_examples_run_no_hooks() {
    let log = CallLog::new();
    let hook = log.clone();
    let mut builder = Suite::builder();
    builder.describe("Later", move |group| {
        group.before(move |_| {
            hook.record("before");
            Ok(())
        });
        group.pending("is planned");
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert!(log.is_empty());
    assert_eq!(
        report.results()[0].verdict(),
        &Verdict::Pending(String::from("not yet implemented"))
    );
    assert!(report.is_success());
}

#[rstest]
fn aborting_omits_examples_not_yet_started() {
    let runner = Runner::new();
    let handle = runner.abort_handle();
    let mut builder = Suite::builder();
    builder.describe("Abort", move |group| {
        group.it("stops the run", move |_| {
            handle.abort();
            Ok(())
        });
        group.it("is omitted", |_| Ok(()));
    });
    let suite = builder.build().expect("build suite");
    let report = runner.run(&suite, &select(&suite, &[]));

    assert_eq!(report.results().len(), 1);
    assert!(report.is_aborted());
    assert!(report.is_success());
}

#[rstest]
#[case(Verdict::Passed, "passed")]
#[case(Verdict::Failed(String::from("boom")), "failed: boom")]
#[case(Verdict::Pending(String::from("later")), "pending: later")]
#[case(
    Verdict::Errored(ErroredCause::UnexpectedException(String::from("io"))),
    "errored: io"
)]
fn verdicts_render_label_and_message(#[case] verdict: Verdict, #[case] expected: &str) {
    assert_eq!(verdict.to_string(), expected);
}

#[rstest]
fn custom_message_assert_is_errored_while_check_fails() {
    let mut builder = Suite::builder();
    builder.describe("Balance", |group| {
        group.it("uses assert with a message", |_| {
            let balance = -5;
            assert!(balance > 0, "balance must be positive");
            Ok(())
        });
        group.it("uses check", |_| crate::check(false, "balance must be positive"));
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert_eq!(
        report.results()[0].verdict(),
        &Verdict::Errored(ErroredCause::UnexpectedException(String::from(
            "balance must be positive"
        )))
    );
    assert_eq!(
        report.results()[1].verdict(),
        &Verdict::Failed(String::from("balance must be positive"))
    );
}

#[rstest]
fn panicking_body_still_runs_every_after_hook_once() {
    let log = CallLog::new();
    let (outer_after, inner_after) = (log.clone(), log.clone());
    let mut builder = Suite::builder();
    builder.describe("Outer", move |outer| {
        outer.after(move |_| {
            outer_after.record("after outer");
            Ok(())
        });
        outer.context("inner", move |inner| {
            inner.after(move |_| {
                inner_after.record("after inner");
                Ok(())
            });
            inner.it("loses its socket", |_| panic!("socket closed"));
        });
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert_eq!(log.entries(), ["after inner", "after outer"]);
    let result = &report.results()[0];
    assert!(result.cleanup_failures().is_empty());
    assert_eq!(
        result.verdict(),
        &Verdict::Errored(ErroredCause::UnexpectedException(String::from(
            "socket closed"
        )))
    );
}

#[rstest]
fn panicking_binding_is_computed_once_per_example() {
    let log = CallLog::new();
    let (computation, cleanup) = (log.clone(), log.clone());
    let mut builder = Suite::builder();
    builder.describe("Connection", move |group| {
        group.define_binding::<u32, _>("connection", move |_| {
            computation.record("connect");
            panic!("connect blew up");
        });
        group.after(move |ctx| {
            if ctx.resolve("connection").is_err() {
                cleanup.record("cleanup saw failure");
            }
            Ok(())
        });
        group.it("reads the connection", |ctx| {
            ctx.resolve("connection")?;
            Ok(())
        });
    });
    let suite = builder.build().expect("build suite");
    let report = Runner::new().run(&suite, &select(&suite, &[]));

    assert_eq!(log.count("connect"), 1);
    assert_eq!(log.entries(), ["connect", "cleanup saw failure"]);
    assert_eq!(
        report.results()[0].verdict(),
        &Verdict::Errored(ErroredCause::UnexpectedException(String::from(
            "connect blew up"
        )))
    );
}
