//! Command-line entry points for suite binaries.
//!
//! A suite binary assembles its [`Suite`] and hands it to [`run_main`], which
//! parses `nestspec [LOCATIONS]... [-e SUBSTRING]... [--fail-fast]
//! [--jobs N] [--config PATH]`, layers the flags over the file and
//! environment configuration, and runs the selected examples.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::providers::Serialized;
use serde::Serialize;

use crate::config::RunConfig;
use crate::{ConfigError, NestspecError, RunReport, Runner, Suite, select};

/// Command-line flags accepted by suite binaries.
///
/// Only flags that were actually passed are layered over the configuration
/// file and environment.
#[derive(Debug, Clone, Default, Parser, Serialize)]
#[command(name = "nestspec", version, about = "Run a nestspec suite")]
pub struct RunArgs {
    /// Locations to run: `path`, `path:line` or `:line`.
    ///
    /// Any argument ending in `:<digits>` or `.rs`, or containing `/`, is a
    /// location. Pass description text of that shape with `-e`.
    #[arg(value_name = "LOCATION")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,

    /// Run only examples whose full description contains SUBSTRING.
    #[arg(short = 'e', long = "example", value_name = "SUBSTRING")]
    #[serde(rename = "examples", skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,

    /// Stop after the first failed or errored example.
    #[arg(long)]
    #[serde(skip_serializing_if = "is_false")]
    pub fail_fast: bool,

    /// Worker threads for top-level groups.
    #[arg(short, long, value_name = "N")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Configuration file to read instead of `.nestspec.toml`.
    #[arg(long, value_name = "PATH")]
    #[serde(skip)]
    pub config: Option<Utf8PathBuf>,
}

impl RunArgs {
    /// Merges these flags over the file and environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration cannot be loaded or
    /// fails validation.
    pub fn load_config(&self) -> Result<RunConfig, ConfigError> {
        let file = self.config.as_deref();
        if let Some(path) = file
            && !path.is_file()
        {
            return Err(ConfigError::MissingFile(path.to_owned()));
        }
        let figment = RunConfig::figment(file).merge(Serialized::defaults(self));
        RunConfig::from_figment(&figment)
    }

    /// Loads the configuration and runs the selected examples of `suite`.
    ///
    /// # Errors
    ///
    /// Returns [`NestspecError::Config`] when the configuration is invalid.
    pub fn run(&self, suite: &Suite) -> Result<RunReport, NestspecError> {
        let config = self.load_config()?;
        let criteria = config.criteria();
        let selection = select(suite, &criteria);
        tracing::info!(
            selected = selection.len(),
            total = suite.len(),
            "running suite"
        );
        Ok(Runner::from_config(&config).run(suite, &selection))
    }
}

/// Runs `suite` with the process arguments.
///
/// # Errors
///
/// Returns [`NestspecError::CliParsing`] for invalid arguments (including
/// `--help` and `--version`, see [`crate::is_display_request`]) and
/// [`NestspecError::Config`] for configuration problems.
pub fn run_main(suite: &Suite) -> Result<RunReport, NestspecError> {
    run_with_args(suite, std::env::args_os())
}

/// Runs `suite` with an explicit argument list; the first item is the
/// program name.
///
/// # Errors
///
/// See [`run_main`].
pub fn run_with_args<I, T>(suite: &Suite, args: I) -> Result<RunReport, NestspecError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parsed = RunArgs::try_parse_from(args)?;
    parsed.run(suite)
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde's skip_serializing_if passes fields by reference"
)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]
mod tests {
    use super::RunArgs;
    use crate::Criterion;
    use crate::config::{ENV_PREFIX, FILE_NAME};
    use camino::Utf8Path;
    use clap::{CommandFactory, Parser};
    use rstest::rstest;
    use serial_test::serial;

    #[rstest]
    fn parses_every_flag() {
        let args = RunArgs::parse_from([
            "nestspec",
            "tests/account.rs:12",
            "-e",
            "#balance",
            "--fail-fast",
            "--jobs",
            "3",
            "--config",
            "ci.toml",
        ]);
        assert_eq!(args.locations, ["tests/account.rs:12"]);
        assert_eq!(args.examples, ["#balance"]);
        assert!(args.fail_fast);
        assert_eq!(args.jobs, Some(3));
        assert_eq!(args.config.as_deref().map(Utf8Path::as_str), Some("ci.toml"));
    }

    #[rstest]
    #[serial]
    fn flags_override_environment_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(FILE_NAME, "jobs = 2\nexamples = [\"file\"]")?;
            jail.set_env(format!("{ENV_PREFIX}JOBS"), "4");
            let args = RunArgs::parse_from(["nestspec", "--jobs", "8"]);
            let config = args.load_config().expect("load merged config");
            assert_eq!(config.jobs, 8);
            assert_eq!(config.examples, ["file"]);
            assert!(!config.fail_fast);
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn absent_flags_leave_lower_layers_alone() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(format!("{ENV_PREFIX}FAIL_FAST"), "true");
            let args = RunArgs::parse_from(["nestspec"]);
            let config = args.load_config().expect("load env config");
            assert!(config.fail_fast);
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn location_shaped_descriptions_go_through_the_example_flag() {
        figment::Jail::expect_with(|_| {
            let positional = RunArgs::parse_from(["nestspec", "closes at 10:30"]);
            let config = positional.load_config().expect("load positional config");
            assert_eq!(config.criteria(), [Criterion::location("closes at 10", Some(30))]);

            let flagged = RunArgs::parse_from(["nestspec", "-e", "closes at 10:30"]);
            let config = flagged.load_config().expect("load flagged config");
            assert_eq!(config.criteria(), [Criterion::description("closes at 10:30")]);
            Ok(())
        });
    }

    #[rstest]
    fn location_help_points_at_the_example_flag() {
        let help = RunArgs::command().render_long_help().to_string();
        assert!(help.contains("`-e`"));
    }
}
