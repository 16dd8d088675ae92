//! Example selection by line, location or description.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use camino::Utf8PathBuf;

use crate::{Entry, Example, ExampleId, GroupId, SourceLocation, Suite};

/// One selection criterion. An example is selected when it matches any of
/// the supplied criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Definition line of the example or of a shared inclusion it came
    /// through, in any file. Group lines select only through
    /// [`Criterion::Location`], where the file pins down the group.
    Line(u32),
    /// A source file, optionally narrowed to one line in it.
    Location {
        /// File path, matched on trailing path components.
        path: Utf8PathBuf,
        /// Line inside `path`.
        line: Option<u32>,
    },
    /// Case-sensitive substring of the fully qualified description.
    Description(String),
}

impl Criterion {
    /// Matches examples in `path`, optionally at `line`.
    #[must_use]
    pub fn location(path: impl Into<Utf8PathBuf>, line: Option<u32>) -> Self {
        Self::Location {
            path: path.into(),
            line,
        }
    }

    /// Matches examples whose fully qualified description contains `text`.
    #[must_use]
    pub fn description(text: impl Into<String>) -> Self {
        Self::Description(text.into())
    }

    /// Parses a command-line filter expression.
    ///
    /// `<path>:<line>` and `:<line>` select by line, anything ending in `.rs`
    /// or containing a path separator selects by file, and everything else
    /// is a description substring. A description that looks like a location,
    /// such as `closes at 10:30`, has to be built with
    /// [`Criterion::description`] (`-e` on the command line).
    ///
    /// ```rust
    /// use nestspec::Criterion;
    ///
    /// assert_eq!(
    ///     Criterion::parse("tests/account.rs:12"),
    ///     Criterion::location("tests/account.rs", Some(12)),
    /// );
    /// assert_eq!(Criterion::parse(":12"), Criterion::Line(12));
    /// assert_eq!(Criterion::parse("tests/account.rs"), Criterion::location("tests/account.rs", None));
    /// assert_eq!(Criterion::parse("#balance"), Criterion::description("#balance"));
    /// ```
    #[must_use]
    pub fn parse(expr: &str) -> Self {
        if let Some((path, line)) = expr.rsplit_once(':')
            && let Ok(number) = line.parse::<u32>()
        {
            return if path.is_empty() {
                Self::Line(number)
            } else {
                Self::location(path, Some(number))
            };
        }
        if expr.ends_with(".rs") || expr.contains('/') || expr.contains(std::path::MAIN_SEPARATOR) {
            Self::location(expr, None)
        } else {
            Self::description(expr)
        }
    }

    fn matches(&self, suite: &Suite, example: &Example, chain: &[GroupId]) -> bool {
        match self {
            Self::Line(line) => own_sites(example).any(|loc| loc.line() == *line),
            Self::Location {
                path,
                line: Some(line),
            } => anchors(suite, example, chain)
                .any(|loc| loc.line() == *line && loc.is_in(path)),
            Self::Location { path, line: None } => {
                own_sites(example).any(|loc| loc.is_in(path))
            }
            Self::Description(text) => suite.full_description(example.id()).contains(text.as_str()),
        }
    }
}

impl FromStr for Criterion {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line(line) => write!(f, ":{line}"),
            Self::Location {
                path,
                line: Some(line),
            } => write!(f, "{path}:{line}"),
            Self::Location { path, line: None } => write!(f, "{path}"),
            Self::Description(text) => write!(f, "{text:?}"),
        }
    }
}

/// An example chosen for execution together with its ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    example: ExampleId,
    chain: Vec<GroupId>,
}

impl Selected {
    /// The selected example.
    #[must_use]
    pub const fn example(&self) -> ExampleId {
        self.example
    }

    /// Ancestor groups of the example, root first.
    #[must_use]
    pub fn chain(&self) -> &[GroupId] {
        &self.chain
    }

    /// The top-level group the example belongs to.
    #[must_use]
    pub fn root(&self) -> Option<GroupId> {
        self.chain.first().copied()
    }
}

/// Returns the examples matching any of `criteria`, in definition order.
///
/// An empty criteria list selects every example.
#[must_use]
pub fn select(suite: &Suite, criteria: &[Criterion]) -> Vec<Selected> {
    let mut selected = Vec::new();
    let mut chain = Vec::new();
    for &root in suite.roots() {
        collect(suite, root, criteria, &mut chain, &mut selected);
    }
    tracing::debug!(
        criteria = criteria.len(),
        selected = selected.len(),
        total = suite.len(),
        "examples selected"
    );
    selected
}

fn collect(
    suite: &Suite,
    group: GroupId,
    criteria: &[Criterion],
    chain: &mut Vec<GroupId>,
    selected: &mut Vec<Selected>,
) {
    chain.push(group);
    for entry in suite.group(group).entries() {
        match *entry {
            Entry::Group(child) => collect(suite, child, criteria, chain, selected),
            Entry::Example(id) => {
                let example = suite.example(id);
                if criteria.is_empty()
                    || criteria
                        .iter()
                        .any(|criterion| criterion.matches(suite, example, chain))
                {
                    selected.push(Selected {
                        example: id,
                        chain: chain.clone(),
                    });
                }
            }
        }
    }
    chain.pop();
}

/// The example's own location and the inclusion sites it came through.
fn own_sites(example: &Example) -> impl Iterator<Item = &SourceLocation> {
    std::iter::once(example.location()).chain(example.inclusion_sites())
}

/// Every location that can anchor a line filter for `example`.
fn anchors<'s>(
    suite: &'s Suite,
    example: &'s Example,
    chain: &'s [GroupId],
) -> impl Iterator<Item = &'s SourceLocation> {
    own_sites(example).chain(chain.iter().flat_map(move |&id| {
        let group = suite.group(id);
        std::iter::once(group.location()).chain(group.inclusion_sites())
    }))
}
