//! Plain-text rendering of a run report.

use std::io::{self, Write};

use nestspec::{RunReport, Verdict};

/// Writes one line per example followed by a summary line.
///
/// # Errors
///
/// Returns an [`io::Error`] when writing to `out` fails.
pub fn write_report<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    for result in report.results() {
        match result.verdict() {
            Verdict::Passed => writeln!(out, "{:<8}{}", "passed", result.description())?,
            verdict => writeln!(
                out,
                "{:<8}{} ({})\n        {}",
                verdict.label(),
                result.description(),
                result.location(),
                verdict.message().unwrap_or_default()
            )?,
        }
        for failure in result.cleanup_failures() {
            writeln!(out, "        {failure}")?;
        }
    }
    let summary = report.summary();
    writeln!(
        out,
        "\n{} examples: {} passed, {} failed, {} pending, {} errored",
        summary.total(),
        summary.passed,
        summary.failed,
        summary.pending,
        summary.errored
    )?;
    if report.is_aborted() {
        writeln!(out, "run aborted before every selected example ran")?;
    }
    Ok(())
}
