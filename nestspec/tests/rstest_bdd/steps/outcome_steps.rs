//! `Then` steps inspecting reports, logs and build errors.

use anyhow::{Result, anyhow, ensure};
use nestspec::{ExampleResult, RunReport, Verdict};
use rstest_bdd_macros::then;

use crate::fixtures::SpecWorld;

fn report(spec_world: &SpecWorld) -> Result<RunReport> {
    spec_world
        .report
        .with_ref(Clone::clone)
        .ok_or_else(|| anyhow!("the suite has not been run"))
}

fn result_for(report: &RunReport, description: &str) -> Result<ExampleResult> {
    report
        .find(description)
        .cloned()
        .ok_or_else(|| anyhow!("no result for {description:?}"))
}

#[then("every example passes")]
fn every_example_passes(spec_world: &SpecWorld) -> Result<()> {
    let report = report(spec_world)?;
    ensure!(!report.results().is_empty(), "no example ran");
    for (description, verdict, message) in report.outcomes() {
        ensure!(
            *verdict == Verdict::Passed,
            "{description} was {} ({message:?})",
            verdict.label()
        );
    }
    Ok(())
}

#[then("{count} examples ran")]
fn examples_ran(spec_world: &SpecWorld, count: usize) -> Result<()> {
    let ran = report(spec_world)?.results().len();
    ensure!(ran == count, "expected {count} examples, {ran} ran");
    Ok(())
}

#[then("the binding was computed {count} times")]
fn binding_computed(spec_world: &SpecWorld, count: usize) -> Result<()> {
    let computed = spec_world.call_log().count("computed");
    ensure!(computed == count, "computed {computed} times, expected {count}");
    Ok(())
}

#[then("the call order is \"{order}\"")]
fn call_order(spec_world: &SpecWorld, order: String) -> Result<()> {
    let recorded = spec_world.call_log().entries().join(", ");
    ensure!(recorded == order, "recorded {recorded:?}, expected {order:?}");
    Ok(())
}

#[then("the example \"{description}\" failed with \"{message}\"")]
fn example_failed(spec_world: &SpecWorld, description: String, message: String) -> Result<()> {
    let result = result_for(&report(spec_world)?, &description)?;
    ensure!(
        *result.verdict() == Verdict::Failed(message.clone()),
        "{description} ended as {}, expected failure {message:?}",
        result.verdict()
    );
    Ok(())
}

#[then("the example \"{description}\" errored with \"{message}\"")]
fn example_errored(spec_world: &SpecWorld, description: String, message: String) -> Result<()> {
    let result = result_for(&report(spec_world)?, &description)?;
    ensure!(
        matches!(result.verdict(), Verdict::Errored(_)),
        "{description} ended as {}, expected an error",
        result.verdict()
    );
    let actual = result.message().unwrap_or_default();
    ensure!(
        actual.contains(&message),
        "error message {actual:?} does not mention {message:?}"
    );
    Ok(())
}

#[then("the example \"{description}\" recorded {count} cleanup failures")]
fn cleanup_failures(spec_world: &SpecWorld, description: String, count: usize) -> Result<()> {
    let result = result_for(&report(spec_world)?, &description)?;
    let recorded = result.cleanup_failures().len();
    ensure!(recorded == count, "recorded {recorded} cleanup failures, expected {count}");
    Ok(())
}

#[then("every executed description contains \"{text}\"")]
fn descriptions_contain(spec_world: &SpecWorld, text: String) -> Result<()> {
    for result in report(spec_world)?.results() {
        ensure!(
            result.description().contains(&text),
            "{} does not contain {text:?}",
            result.description()
        );
    }
    Ok(())
}

#[then("the run was aborted")]
fn run_aborted(spec_world: &SpecWorld) -> Result<()> {
    ensure!(report(spec_world)?.is_aborted(), "the run completed");
    Ok(())
}

#[then("building the suite failed mentioning \"{name}\"")]
fn build_failed(spec_world: &SpecWorld, name: String) -> Result<()> {
    ensure!(spec_world.suite.is_empty(), "the suite was built");
    let error = spec_world
        .build_error
        .with_ref(Clone::clone)
        .ok_or_else(|| anyhow!("no build error recorded"))?;
    ensure!(error.contains(&name), "{error:?} does not mention {name:?}");
    Ok(())
}
