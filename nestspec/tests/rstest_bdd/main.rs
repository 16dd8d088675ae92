//! `rstest-bdd` behavioural suite for `nestspec`.
//!
//! Feature files live in `tests/features`; [`scenarios`] binds them to the
//! shared [`fixtures`], and the step registry is populated by [`steps`].

mod fixtures;
mod scenarios;
mod steps;
