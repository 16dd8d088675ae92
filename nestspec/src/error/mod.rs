//! Error types produced while assembling and running suites.
//!
//! Build-time problems ([`BuildError`]) abort suite assembly. Per-example
//! problems never escape the runner: bodies and hooks return [`Failure`]
//! values, which the runner folds into a verdict.

mod aggregate;
mod failure;
mod helpers;
mod types;

pub use aggregate::AggregatedBuildErrors;
pub use failure::{Failure, Outcome, check, check_eq};
pub use helpers::is_display_request;
pub use types::{BuildError, ConfigError, NestspecError, ResolveError};
