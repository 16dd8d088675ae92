//! Core crate for the `nestspec` behaviour-driven test engine.
//!
//! A suite is a tree of example groups (`describe`/`context`) holding
//! examples, lazily memoized bindings (`let`/`subject`) and `before`/`after`
//! hooks. Suites are assembled once through a [`SuiteBuilder`], filtered with
//! [`select`], and executed by a [`Runner`] that produces a [`RunReport`].
//!
//! ```rust
//! use nestspec::{Runner, Suite, check_eq, select};
//!
//! let mut builder = Suite::builder();
//! builder.describe("Account", |account| {
//!     account.define_binding("balance", |_| Ok(0_i64));
//!     account.describe("#balance", |balance| {
//!         balance.it("is zero initially", |ctx| {
//!             let balance = ctx.value::<i64>("balance")?;
//!             check_eq(balance, 0)
//!         });
//!     });
//! });
//! let suite = builder.build()?;
//!
//! let selection = select(&suite, &[]);
//! let report = Runner::new().run(&suite, &selection);
//! assert!(report.is_success());
//! # Ok::<_, nestspec::BuildError>(())
//! ```

mod binding;
pub mod cli;
pub mod config;
mod error;
mod location;
mod runner;
mod select;
mod shared;
pub mod subject;
mod tree;

pub use binding::{ExampleContext, SUBJECT};
pub use error::{
    AggregatedBuildErrors, BuildError, ConfigError, Failure, NestspecError, Outcome, ResolveError,
    check, check_eq, is_display_request,
};
pub use location::SourceLocation;
pub use runner::{
    AbortHandle, ErroredCause, ExampleResult, HookFailure, HookPhase, RunReport, Runner, Summary,
    Verdict,
};
pub use select::{Criterion, Selected, select};
pub use shared::Overrides;
pub use tree::{Entry, Example, ExampleId, Group, GroupBuilder, GroupId, Suite, SuiteBuilder};
