//! `When` steps that select and run examples.

use anyhow::{Result, anyhow};
use nestspec::{Criterion, GroupId, Runner, Suite, select};
use rstest_bdd_macros::when;

use crate::fixtures::SpecWorld;

fn run(spec_world: &SpecWorld, runner: &Runner, criteria: &[Criterion]) -> Result<()> {
    let suite = spec_world.suite.with_ref(Clone::clone).ok_or_else(|| {
        anyhow!(
            "suite was not built: {}",
            spec_world.build_error.with_ref(Clone::clone).unwrap_or_default()
        )
    })?;
    let selection = select(&suite, criteria);
    spec_world.report.set(runner.run(&suite, &selection));
    Ok(())
}

fn find_group(suite: &Suite, description: &str) -> Option<GroupId> {
    let mut pending: Vec<GroupId> = suite.roots().to_vec();
    while let Some(id) = pending.pop() {
        let group = suite.group(id);
        if group.description() == description {
            return Some(id);
        }
        pending.extend(group.children());
    }
    None
}

#[when("the whole suite runs")]
fn run_everything(spec_world: &SpecWorld) -> Result<()> {
    run(spec_world, &Runner::new(), &[])
}

#[when("the whole suite runs with fail fast")]
fn run_fail_fast(spec_world: &SpecWorld) -> Result<()> {
    run(spec_world, &Runner::new().fail_fast(true), &[])
}

#[when("the examples matching \"{text}\" run")]
fn run_matching(spec_world: &SpecWorld, text: String) -> Result<()> {
    run(spec_world, &Runner::new(), &[Criterion::description(text)])
}

#[when("the examples under the group \"{description}\" run")]
fn run_group_line(spec_world: &SpecWorld, description: String) -> Result<()> {
    let suite = spec_world
        .suite
        .with_ref(Clone::clone)
        .ok_or_else(|| anyhow!("suite was not built"))?;
    let id = find_group(&suite, &description)
        .ok_or_else(|| anyhow!("no group described {description:?}"))?;
    let location = suite.group(id).location();
    let criterion = Criterion::location(location.file(), Some(location.line()));
    run(spec_world, &Runner::new(), &[criterion])
}
