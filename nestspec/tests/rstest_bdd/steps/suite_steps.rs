//! `Given` steps that assemble the suites under test.

use std::cell::Cell;
use std::sync::Arc;

use anyhow::{Result, ensure};
use nestspec::{
    ExampleContext, Failure, Outcome, Overrides, Suite, SuiteBuilder, check, check_eq,
};
use rstest_bdd_macros::given;

use crate::fixtures::SpecWorld;

/// Builds `builder` into the world, keeping the error text on failure.
fn install(spec_world: &SpecWorld, builder: SuiteBuilder) -> Result<()> {
    ensure!(spec_world.suite.is_empty(), "suite already assembled");
    match builder.build() {
        Ok(suite) => {
            spec_world.suite.set(Arc::new(suite));
        }
        Err(err) => {
            spec_world.build_error.set(err.to_string());
        }
    }
    Ok(())
}

#[given("a group whose counting binding is read {reads} times by each of {examples} examples")]
fn counting_binding(spec_world: &SpecWorld, reads: usize, examples: usize) -> Result<()> {
    let log = spec_world.call_log();
    let mut builder = Suite::builder();
    builder.describe("Counting", move |group| {
        group.define_binding("count", move |_| {
            log.record("computed");
            Ok(7_u32)
        });
        for index in 0..examples {
            group.it(format!("reads {index}"), move |ctx| {
                for _ in 0..reads {
                    check_eq(ctx.value::<u32>("count")?, 7)?;
                }
                Ok(())
            });
        }
    });
    install(spec_world, builder)
}

#[given("an outer binding \"{outer}\" shadowed by an inner binding \"{inner}\"")]
fn shadowed_binding(spec_world: &SpecWorld, outer: String, inner: String) -> Result<()> {
    let log = spec_world.call_log();
    let (outer_log, inner_log) = (log.clone(), log);
    let mut builder = Suite::builder();
    builder.describe("Shadowing", move |group| {
        group.define_binding("level", move |_| Ok(outer.clone()));
        group.it("reads outer", move |ctx| {
            outer_log.record(ctx.value::<String>("level")?);
            Ok(())
        });
        group.context("nested", move |nested| {
            nested.define_binding("level", move |_| Ok(inner.clone()));
            nested.it("reads inner", move |ctx| {
                inner_log.record(ctx.value::<String>("level")?);
                Ok(())
            });
        });
    });
    install(spec_world, builder)
}

#[given("a binding that reads itself")]
fn self_referential_binding(spec_world: &SpecWorld) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Cycle", |group| {
        group.define_binding("looped", |ctx| ctx.value::<u8>("looped"));
        group.it("reads", |ctx| ctx.value::<u8>("looped").map(drop));
    });
    install(spec_world, builder)
}

#[given("an eager binding the body never reads")]
fn eager_binding(spec_world: &SpecWorld) -> Result<()> {
    let log = spec_world.call_log();
    let (eager, body) = (log.clone(), log);
    let mut builder = Suite::builder();
    builder.describe("Eager", move |group| {
        group.define_eager_binding("audit", move |_| {
            eager.record("eager");
            Ok(())
        });
        group.it("ignores it", move |_| {
            body.record("body");
            Ok(())
        });
    });
    install(spec_world, builder)
}

#[given("nested groups with before and after hooks")]
fn nested_hooks(spec_world: &SpecWorld) -> Result<()> {
    let log = spec_world.call_log();
    let mut builder = Suite::builder();
    builder.describe("Outer", move |outer| {
        let record = |label: &'static str| {
            let hook_log = log.clone();
            move |_: &ExampleContext<'_>| -> Outcome {
                hook_log.record(label);
                Ok(())
            }
        };
        outer.before(record("before outer"));
        outer.after(record("after outer"));
        let (before, after, body) = (
            record("before inner"),
            record("after inner"),
            record("body"),
        );
        outer.context("inner", move |inner| {
            inner.before(before);
            inner.after(after);
            inner.it("runs", body);
        });
    });
    install(spec_world, builder)
}

#[given("an example that fails inside a group with an after hook")]
fn failing_body_with_cleanup(spec_world: &SpecWorld) -> Result<()> {
    let log = spec_world.call_log();
    let mut builder = Suite::builder();
    builder.describe("Cleanup", move |group| {
        group.after(move |_| {
            log.record("after");
            Ok(())
        });
        group.it("compares", |_| check_eq(1, 2));
    });
    install(spec_world, builder)
}

#[given("a failing example whose after hook also fails")]
fn failing_body_and_cleanup(spec_world: &SpecWorld) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Both", |group| {
        group.after(|_| Err(Failure::message("cleanup failed")));
        group.it("fails", |_| Err(Failure::assertion("primary")));
    });
    install(spec_world, builder)
}

#[given("a passing example whose after hook fails")]
fn passing_body_failing_cleanup(spec_world: &SpecWorld) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Teardown", |group| {
        group.after(|_| Err(Failure::message("disk full")));
        group.it("passes", |_| Ok(()));
    });
    install(spec_world, builder)
}

#[given("a bounded counter template included with limits {small} and {large}")]
fn bounded_counter(spec_world: &SpecWorld, small: u32, large: u32) -> Result<()> {
    let mut builder = Suite::builder();
    builder.register_template("a bounded counter", |group| {
        group.define_binding("count", |_| Ok(Cell::new(0_u32)));
        group.it("starts at zero", |ctx| check_eq(ctx.get::<Cell<u32>>("count")?.get(), 0));
        group.it("counts up to its limit", |ctx| {
            let limit = ctx.value::<u32>("limit")?;
            let count = ctx.get::<Cell<u32>>("count")?;
            for _ in 0..limit {
                count.set(count.get() + 1);
            }
            check(count.get() == limit, format!("counted {} of {limit}", count.get()))
        });
    });
    builder.describe("Counter", |counter| {
        counter.context("small", |group| {
            group.include_shared("a bounded counter", Overrides::new().value("limit", small));
        });
        counter.context("large", |group| {
            group.include_shared("a bounded counter", Overrides::new().value("limit", large));
        });
    });
    install(spec_world, builder)
}

#[given("a group including the unknown template \"{name}\"")]
fn unknown_template(spec_world: &SpecWorld, name: String) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Ghostly", |group| {
        group.include_shared(&name, Overrides::new());
    });
    install(spec_world, builder)
}

#[given("the account suite")]
fn account_suite(spec_world: &SpecWorld) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Account", |account| {
        account.define_binding("balance", |_| Ok(0_i64));
        account.describe("#balance", |balance| {
            balance.it("starts at zero", |ctx| check_eq(ctx.value::<i64>("balance")?, 0));
            balance.it("reflects deposits", |ctx| {
                check_eq(ctx.value::<i64>("balance")? + 10, 10)
            });
        });
        account.describe("#deposit", |deposit| {
            deposit.it("rejects negative amounts", |_| Ok(()));
        });
    });
    install(spec_world, builder)
}

#[given("a suite whose first example fails")]
fn failing_first_example(spec_world: &SpecWorld) -> Result<()> {
    let mut builder = Suite::builder();
    builder.describe("Fast", |group| {
        group.it("fails", |_| Err(Failure::assertion("stop here")));
        group.it("never runs", |_| Ok(()));
    });
    install(spec_world, builder)
}
