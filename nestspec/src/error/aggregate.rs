//! Aggregation of several [`BuildError`]s raised by one assembly.

use std::{error::Error, fmt};

use super::BuildError;

/// Collection of [`BuildError`]s produced while assembling a single suite.
#[derive(Debug, Default)]
pub struct AggregatedBuildErrors(Vec<BuildError>);

impl AggregatedBuildErrors {
    /// Number of errors in the aggregation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the aggregation holds no errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &BuildError> {
        self.0.iter()
    }
}

impl fmt::Display for AggregatedBuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}

impl Error for AggregatedBuildErrors {}

impl BuildError {
    /// Collapses `errors` into a single error.
    ///
    /// Returns `None` for an empty list, the error itself for a single entry
    /// and [`BuildError::Aggregate`] otherwise.
    #[must_use]
    pub fn try_aggregate(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(Box::new(AggregatedBuildErrors(errors)))),
        }
    }
}
