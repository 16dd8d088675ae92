//! Step definitions registered with `rstest-bdd`.

mod outcome_steps;
mod run_steps;
mod suite_steps;
