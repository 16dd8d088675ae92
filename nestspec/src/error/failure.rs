//! Control values returned by example bodies, hooks and bindings.

use std::error::Error;
use std::fmt;

/// Result type for example bodies, hooks and binding computations.
pub type Outcome<T = ()> = Result<T, Failure>;

/// Why a body, hook or binding computation did not complete normally.
///
/// `Failure` deliberately does not implement [`std::error::Error`], which
/// allows any error type to convert into [`Failure::Error`] through `?`.
#[derive(Debug)]
pub enum Failure {
    /// An expectation did not hold; reported as `Failed` with this message.
    Assertion(String),
    /// The example is not ready to run; reported as `Pending`.
    Pending(String),
    /// An unexpected error; reported as `Errored`.
    Error(Box<dyn Error + Send + Sync>),
}

impl Failure {
    /// Builds an assertion failure carrying `message` verbatim.
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Marks the current example as pending.
    #[must_use]
    pub fn pending(reason: impl Into<String>) -> Self {
        Self::Pending(reason.into())
    }

    /// Builds an unexpected error from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        let text: String = message.into();
        Self::Error(text.into())
    }

    /// Returns `true` for [`Failure::Assertion`].
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion(message) | Self::Pending(message) => f.write_str(message),
            Self::Error(err) => write!(f, "{err}"),
        }
    }
}

impl<E> From<E> for Failure
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Error(Box::new(err))
    }
}

/// Fails with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`Failure::Assertion`] when `condition` is `false`.
pub fn check(condition: bool, message: impl Into<String>) -> Outcome {
    if condition {
        Ok(())
    } else {
        Err(Failure::Assertion(message.into()))
    }
}

/// Fails unless `actual == expected`.
///
/// # Errors
///
/// Returns [`Failure::Assertion`] describing both values when they differ.
pub fn check_eq<T>(actual: T, expected: T) -> Outcome
where
    T: PartialEq + fmt::Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(Failure::Assertion(format!(
            "expected {expected:?}, got {actual:?}"
        )))
    }
}
