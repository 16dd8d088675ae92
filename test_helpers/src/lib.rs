//! Test helpers shared across the nestspec workspace.
//!
//! [`recorder`] captures the order in which hooks, bindings and bodies run;
//! [`jail`] wraps `figment::Jail` for configuration tests.

pub mod jail;
pub mod recorder;

pub use jail::with_jail;
pub use recorder::CallLog;
