//! Helpers for classifying command-line errors.

use clap::{Error as ClapError, error::ErrorKind};

/// Returns `true` when a [`clap::Error`] is a `--help` or `--version` request.
///
/// Suite binaries that call [`crate::cli::run_main`] should hand such errors
/// to [`clap::Error::exit`] so the request prints and exits successfully.
#[must_use]
pub fn is_display_request(err: &ClapError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}
