//! Primary error enums for suite assembly, binding resolution and loading.

use camino::Utf8PathBuf;
use figment::Error as FigmentError;
use thiserror::Error;

use super::AggregatedBuildErrors;
use crate::SourceLocation;

/// Fatal problems detected while assembling a suite.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BuildError {
    /// A group included a shared template that was never registered.
    #[error("unknown shared example template '{name}' included at {location}")]
    UnknownTemplate {
        /// Name passed to the inclusion.
        name: String,
        /// Call site of the inclusion.
        location: SourceLocation,
    },

    /// A shared template includes itself, directly or through other templates.
    #[error("shared example template '{name}' includes itself: {chain}")]
    RecursiveTemplate {
        /// Template whose inclusion closed the cycle.
        name: String,
        /// Inclusion chain rendered as `a -> b -> a`.
        chain: String,
    },

    /// Two templates were registered under the same name.
    #[error("shared example template '{name}' registered twice (first at {first}, again at {second})")]
    DuplicateTemplate {
        /// Conflicting template name.
        name: String,
        /// Location of the first registration.
        first: SourceLocation,
        /// Location of the rejected registration.
        second: SourceLocation,
    },

    /// Several build errors occurred while assembling one suite.
    #[error("multiple suite assembly errors:\n{0}")]
    Aggregate(Box<AggregatedBuildErrors>),
}

/// Failures raised while resolving a binding inside one example.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No group in the example's ancestry defines the binding.
    #[error("undefined binding '{name}' in '{example}'")]
    UndefinedBinding {
        /// Requested binding name.
        name: String,
        /// Fully qualified description of the running example.
        example: String,
    },

    /// A binding's computation resolved itself.
    #[error("cyclic binding resolution: {cycle}")]
    CyclicBinding {
        /// Resolution stack rendered as `a -> b -> a`.
        cycle: String,
    },

    /// The memoized value has a different type than the caller asked for.
    #[error("binding '{name}' does not hold a value of type {expected}")]
    BindingTypeMismatch {
        /// Requested binding name.
        name: String,
        /// Type requested by the caller.
        expected: &'static str,
    },

    /// The binding's computation already failed earlier in this example.
    #[error("binding '{name}' failed earlier in this example: {message}")]
    BindingFailed {
        /// Binding whose computation failed.
        name: String,
        /// Message recorded from the first failure.
        message: String,
    },
}

/// Errors raised while loading run configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Error while gathering configuration from providers.
    #[error("failed to load run configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file '{0}' does not exist")]
    MissingFile(Utf8PathBuf),

    /// A configuration value failed validation.
    #[error("invalid value for '{key}': {message}")]
    Validation {
        /// Configuration key that failed validation.
        key: String,
        /// Human-readable explanation of the failure.
        message: String,
    },
}

impl From<FigmentError> for ConfigError {
    fn from(err: FigmentError) -> Self {
        Self::Gathering(Box::new(err))
    }
}

/// Top-level error returned by suite entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NestspecError {
    /// Error parsing command-line arguments.
    #[error("failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// Suite assembly failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Run configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<clap::Error> for NestspecError {
    fn from(err: clap::Error) -> Self {
        Self::CliParsing(Box::new(err))
    }
}
