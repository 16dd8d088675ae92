//! A small bank account domain and the nestspec suite that describes it.
//!
//! The `bank-account` binary assembles [`specs::suite`] and hands it to
//! [`nestspec::cli::run_main`], so every command-line flag and
//! configuration layer of the engine applies to it.

pub mod account;
pub mod error;
pub mod report;
pub mod specs;

pub use account::Account;
pub use error::AccountError;
