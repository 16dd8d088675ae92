//! Source locations recorded for groups, examples and inclusion sites.

use std::fmt;
use std::panic::Location;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// File, line and column at which a group, example or hook was defined.
///
/// Locations are captured with `#[track_caller]`, so they point at the user's
/// `describe`/`it` call rather than at the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: Utf8PathBuf,
    line: u32,
    column: u32,
}

impl SourceLocation {
    /// Creates a location from its parts.
    #[must_use]
    pub fn new(file: impl Into<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: normalise(&file.into()),
            line,
            column,
        }
    }

    /// Captures the location of the caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line(), location.column())
    }

    /// Source file of the definition.
    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    /// One-based line of the definition.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// One-based column of the definition.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns `true` when `path` names this location's file.
    ///
    /// Matching is component-wise on the trailing components, so
    /// `tests/account.rs` matches `demos/bank/tests/account.rs` but
    /// `count.rs` does not.
    #[must_use]
    pub fn is_in(&self, path: &Utf8Path) -> bool {
        let wanted = normalise(path);
        !wanted.as_str().is_empty() && (self.file == wanted || self.file.ends_with(&wanted))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Drops `.` components so `./tests/a.rs` and `tests/a.rs` compare equal.
fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect()
}
