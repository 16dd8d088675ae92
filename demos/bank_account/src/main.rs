//! Runs the bank account suite: `bank-account [LOCATIONS]... [-e SUBSTRING]...`.

use std::io;
use std::process::ExitCode;

use bank_account::report::write_report;
use bank_account::specs;
use nestspec::{NestspecError, cli, is_display_request};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let suite = specs::suite()?;
    let report = match cli::run_main(&suite) {
        Ok(report) => report,
        Err(NestspecError::CliParsing(err)) if is_display_request(&err) => err.exit(),
        Err(err) => return Err(err.into()),
    };
    write_report(&mut io::stdout().lock(), &report)?;
    tracing::debug!(aborted = report.is_aborted(), "report written");
    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
