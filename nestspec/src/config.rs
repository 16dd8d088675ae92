//! Layered run configuration.
//!
//! Values are merged with increasing precedence from built-in defaults, a
//! TOML file (`.nestspec.toml` in the working directory, or the file passed
//! with `--config`), `NESTSPEC_`-prefixed environment variables and finally
//! command-line flags.
//!
//! ```toml
//! # .nestspec.toml
//! fail_fast = true
//! jobs = 4
//! locations = ["tests/account.rs:12"]
//! examples = ["#balance"]
//! ```

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Criterion};

/// Prefix for environment variables, for example `NESTSPEC_FAIL_FAST`.
pub const ENV_PREFIX: &str = "NESTSPEC_";

/// Configuration file looked up when no explicit path is supplied.
pub const FILE_NAME: &str = ".nestspec.toml";

/// Settings controlling one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Stop after the first failed or errored example.
    pub fail_fast: bool,
    /// Worker threads; top-level groups run in parallel when above one.
    pub jobs: usize,
    /// Location filters (`path`, `path:line` or `:line`).
    pub locations: Vec<String>,
    /// Description substrings.
    pub examples: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            jobs: 1,
            locations: Vec::new(),
            examples: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Builds the default, file and environment layers.
    ///
    /// With `file` set, that exact file is read; otherwise [`FILE_NAME`] in
    /// the working directory is read when present and skipped when absent.
    #[must_use]
    pub fn figment(file: Option<&Utf8Path>) -> Figment {
        let defaults = Figment::from(Serialized::defaults(Self::default()));
        let layered = match file {
            Some(path) => defaults.merge(Toml::file_exact(path.as_std_path())),
            None if Utf8Path::new(FILE_NAME).is_file() => {
                defaults.merge(Toml::file_exact(FILE_NAME))
            }
            None => defaults,
        };
        layered.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads and validates configuration from defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] when `file` does not exist,
    /// [`ConfigError::Gathering`] when a provider fails or a value has the
    /// wrong shape, and [`ConfigError::Validation`] for out-of-range values.
    pub fn load(file: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        if let Some(path) = file
            && !path.is_file()
        {
            return Err(ConfigError::MissingFile(path.to_owned()));
        }
        Self::from_figment(&Self::figment(file))
    }

    /// Extracts and validates a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        tracing::debug!(?config, "run configuration loaded");
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when `jobs` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::Validation {
                key: String::from("jobs"),
                message: String::from("must be at least 1"),
            });
        }
        Ok(())
    }

    /// Selection criteria described by `locations` and `examples`.
    #[must_use]
    pub fn criteria(&self) -> Vec<Criterion> {
        self.locations
            .iter()
            .map(|expr| Criterion::parse(expr))
            .chain(self.examples.iter().map(Criterion::description))
            .collect()
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]
mod tests {
    use super::{ENV_PREFIX, FILE_NAME, RunConfig};
    use crate::{ConfigError, Criterion};
    use camino::Utf8Path;
    use rstest::rstest;
    use serial_test::serial;

    #[rstest]
    #[serial]
    fn defaults_apply_without_sources() {
        figment::Jail::expect_with(|_| {
            let config = RunConfig::load(None).expect("load defaults");
            assert_eq!(config, RunConfig::default());
            assert_eq!(config.jobs, 1);
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn absent_default_file_is_skipped() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(format!("{ENV_PREFIX}JOBS"), "3");
            assert!(!Utf8Path::new(FILE_NAME).exists());
            let config = RunConfig::load(None).expect("load without a config file");
            assert_eq!(config.jobs, 3);
            assert!(config.criteria().is_empty());
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(FILE_NAME, "jobs = 2\nfail_fast = false")?;
            jail.set_env(format!("{ENV_PREFIX}FAIL_FAST"), "true");
            let config = RunConfig::load(None).expect("load layered config");
            assert_eq!(config.jobs, 2);
            assert!(config.fail_fast);
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn explicit_file_must_exist() {
        figment::Jail::expect_with(|_| {
            let err = RunConfig::load(Some(Utf8Path::new("absent.toml")))
                .expect_err("missing file should fail");
            assert!(matches!(err, ConfigError::MissingFile(path) if path == "absent.toml"));
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn zero_jobs_is_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(format!("{ENV_PREFIX}JOBS"), "0");
            let err = RunConfig::load(None).expect_err("zero jobs should fail");
            assert!(matches!(err, ConfigError::Validation { ref key, .. } if key == "jobs"));
            Ok(())
        });
    }

    #[rstest]
    #[serial]
    fn malformed_values_are_gathering_errors() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(FILE_NAME, "jobs = \"many\"")?;
            let err = RunConfig::load(None).expect_err("string jobs should fail");
            assert!(matches!(err, ConfigError::Gathering(_)));
            Ok(())
        });
    }

    #[rstest]
    fn criteria_combine_locations_and_examples() {
        let config = RunConfig {
            locations: vec![String::from("tests/account.rs:12"), String::from(":7")],
            examples: vec![String::from("#balance")],
            ..RunConfig::default()
        };
        assert_eq!(
            config.criteria(),
            vec![
                Criterion::location("tests/account.rs", Some(12)),
                Criterion::Line(7),
                Criterion::description("#balance"),
            ]
        );
    }
}
