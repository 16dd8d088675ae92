//! Per-example verdicts.

use std::any::Any;
use std::fmt;

use crate::{ExampleId, Failure, SourceLocation};

/// Which hook list a hook failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// A `before` hook (setup).
    Before,
    /// An `after` hook (cleanup).
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Before => "before",
            Self::After => "after",
        })
    }
}

/// A hook that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    /// Setup or cleanup.
    pub phase: HookPhase,
    /// Description of the group declaring the hook.
    pub group: String,
    /// Where the hook was declared.
    pub location: SourceLocation,
    /// Failure message, verbatim.
    pub message: String,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hook of '{}' ({}) failed: {}",
            self.phase, self.group, self.location, self.message
        )
    }
}

/// Why an example errored rather than failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErroredCause {
    /// A setup hook failed, or a cleanup hook failed after a passing body.
    Hook(HookFailure),
    /// The body raised something other than an assertion failure.
    UnexpectedException(String),
}

impl fmt::Display for ErroredCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hook(failure) => write!(f, "{failure}"),
            Self::UnexpectedException(message) => f.write_str(message),
        }
    }
}

/// Terminal state of one example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Body and every hook completed.
    Passed,
    /// An assertion did not hold.
    Failed(String),
    /// The example has no body, was skipped, or marked itself pending.
    Pending(String),
    /// Setup, cleanup or the body hit an unexpected error.
    Errored(ErroredCause),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Failed`] and [`Verdict::Errored`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Errored(_))
    }

    /// Short lowercase label: `passed`, `failed`, `pending` or `errored`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed(_) => "failed",
            Self::Pending(_) => "pending",
            Self::Errored(_) => "errored",
        }
    }

    /// Human-readable message, absent for passing examples.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Passed => None,
            Self::Failed(message) | Self::Pending(message) => Some(message.clone()),
            Self::Errored(cause) => Some(cause.to_string()),
        }
    }

    /// Classifies the outcome of an example body.
    pub(crate) fn from_body(outcome: Result<(), Failure>) -> Self {
        match outcome {
            Ok(()) => Self::Passed,
            Err(Failure::Assertion(message)) => Self::Failed(message),
            Err(Failure::Pending(reason)) => Self::Pending(reason),
            Err(Failure::Error(err)) => {
                Self::Errored(ErroredCause::UnexpectedException(err.to_string()))
            }
        }
    }

    /// Classifies a panic raised by an example body.
    ///
    /// Only panics whose message starts with `assertion` count as assertion
    /// failures: bare `assert!(cond)` and every `assert_eq!`/`assert_ne!`.
    /// `assert!(cond, "message")` panics with the custom message alone, so it
    /// is indistinguishable from `panic!` and reports `Errored`; use
    /// [`crate::check`] or [`Failure::assertion`] for custom messages.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = panic_message(payload);
        if is_assertion_panic(&message) {
            Self::Failed(message)
        } else {
            Self::Errored(ErroredCause::UnexpectedException(message))
        }
    }

    /// Folds cleanup failures into the primary verdict.
    ///
    /// Only a passing example changes: it becomes `Errored` with the first
    /// cleanup failure. Every other verdict is kept as is.
    pub(crate) fn with_cleanup(self, cleanup: &[HookFailure]) -> Self {
        match (self, cleanup.first()) {
            (Self::Passed, Some(failure)) => Self::Errored(ErroredCause::Hook(failure.clone())),
            (verdict, _) => verdict,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())?;
        if let Some(message) = self.message() {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Outcome of one executed example.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleResult {
    pub(crate) example: ExampleId,
    pub(crate) description: String,
    pub(crate) location: SourceLocation,
    pub(crate) verdict: Verdict,
    pub(crate) cleanup_failures: Vec<HookFailure>,
}

impl ExampleResult {
    /// The example this result belongs to.
    #[must_use]
    pub const fn example(&self) -> ExampleId {
        self.example
    }

    /// Fully qualified description of the example.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the example was defined.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The terminal verdict.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Human-readable message for non-passing verdicts.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.verdict.message()
    }

    /// Every cleanup hook failure, including one promoted into the verdict.
    #[must_use]
    pub fn cleanup_failures(&self) -> &[HookFailure] {
        &self.cleanup_failures
    }
}

/// Whether a panic message comes from the standard assertion macros.
pub(crate) fn is_assertion_panic(message: &str) -> bool {
    message.starts_with("assertion")
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("example panicked with a non-string payload"))
}
