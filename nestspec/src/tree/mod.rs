//! The example group tree.
//!
//! A [`Suite`] is an arena owning every [`Group`] and [`Example`]; nodes refer
//! to each other through [`GroupId`] and [`ExampleId`] indices, with parent
//! pointers on groups and owner pointers on examples. Binding lookup walks
//! those pointers at resolve time, which is what gives `let`/`subject` their
//! lexical shadowing.

mod builder;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use builder::{GroupBuilder, SuiteBuilder};

use crate::binding::BindingDef;
use crate::{ExampleContext, Outcome, SourceLocation};

/// Body of an example or hook.
pub(crate) type Action = dyn Fn(&ExampleContext<'_>) -> Outcome + Send + Sync;

/// Index of a group within its [`Suite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(usize);

/// Index of an example within its [`Suite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExampleId(usize);

/// A child of a group, in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// A nested group.
    Group(GroupId),
    /// An example owned by the group.
    Example(ExampleId),
}

#[derive(Clone)]
pub(crate) struct Hook {
    location: SourceLocation,
    action: Arc<Action>,
}

impl Hook {
    pub(crate) const fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub(crate) fn call(&self, ctx: &ExampleContext<'_>) -> Outcome {
        (self.action)(ctx)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// A `describe`/`context` node.
#[derive(Debug)]
pub struct Group {
    id: GroupId,
    parent: Option<GroupId>,
    description: String,
    location: SourceLocation,
    inclusion_sites: Vec<SourceLocation>,
    entries: Vec<Entry>,
    bindings: HashMap<String, BindingDef>,
    before: Vec<Hook>,
    after: Vec<Hook>,
    implicit_subject: Option<BindingDef>,
}

impl Group {
    /// Identifier of this group.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Enclosing group, `None` for roots.
    #[must_use]
    pub const fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    /// The group's own description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the group was defined.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Shared-template inclusion calls this group was instantiated through,
    /// outermost first. Empty for groups written directly.
    #[must_use]
    pub fn inclusion_sites(&self) -> &[SourceLocation] {
        &self.inclusion_sites
    }

    /// Child groups and examples in definition order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Child groups in definition order.
    pub fn children(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Group(id) => Some(*id),
            Entry::Example(_) => None,
        })
    }

    /// Examples owned directly by this group, in definition order.
    pub fn examples(&self) -> impl Iterator<Item = ExampleId> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Example(id) => Some(*id),
            Entry::Group(_) => None,
        })
    }

    /// Returns `true` when this group itself defines `name`.
    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of `before` hooks declared on this group.
    #[must_use]
    pub fn before_hook_count(&self) -> usize {
        self.before.len()
    }

    /// Number of `after` hooks declared on this group.
    #[must_use]
    pub fn after_hook_count(&self) -> usize {
        self.after.len()
    }

    /// Returns `true` when a subject naming convention supplied a default
    /// subject for this (root) group.
    #[must_use]
    pub const fn has_implicit_subject(&self) -> bool {
        self.implicit_subject.is_some()
    }

    pub(crate) fn binding(&self, name: &str) -> Option<&BindingDef> {
        self.bindings.get(name)
    }

    pub(crate) const fn implicit_subject(&self) -> Option<&BindingDef> {
        self.implicit_subject.as_ref()
    }

    pub(crate) fn before_hooks(&self) -> &[Hook] {
        &self.before
    }

    pub(crate) fn after_hooks(&self) -> &[Hook] {
        &self.after
    }
}

/// A single leaf test case.
pub struct Example {
    id: ExampleId,
    group: GroupId,
    description: String,
    location: SourceLocation,
    inclusion_sites: Vec<SourceLocation>,
    body: Option<Arc<Action>>,
    skip: Option<String>,
}

impl Example {
    /// Identifier of this example.
    #[must_use]
    pub const fn id(&self) -> ExampleId {
        self.id
    }

    /// Group that owns the example.
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// The example's own description; may be empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Where the example was defined.
    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Shared-template inclusion calls this example came through.
    #[must_use]
    pub fn inclusion_sites(&self) -> &[SourceLocation] {
        &self.inclusion_sites
    }

    /// Why the example will not run, if it is pending or skipped.
    #[must_use]
    pub fn pending_reason(&self) -> Option<&str> {
        match (&self.skip, &self.body) {
            (Some(reason), _) => Some(reason.as_str()),
            (None, None) => Some("not yet implemented"),
            (None, Some(_)) => None,
        }
    }

    pub(crate) fn body(&self) -> Option<&Action> {
        self.body.as_deref()
    }
}

impl fmt::Debug for Example {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Example")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("description", &self.description)
            .field("location", &self.location)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

/// A fully assembled, immutable tree of groups and examples.
#[derive(Debug, Default)]
pub struct Suite {
    groups: Vec<Group>,
    examples: Vec<Example>,
    roots: Vec<GroupId>,
}

impl Suite {
    /// Starts assembling a suite.
    #[must_use]
    pub fn builder() -> SuiteBuilder {
        SuiteBuilder::new()
    }

    /// Top-level groups in definition order.
    #[must_use]
    pub fn roots(&self) -> &[GroupId] {
        &self.roots
    }

    /// Looks up a group.
    ///
    /// # Panics
    ///
    /// Panics when `id` was issued by a different suite.
    #[must_use]
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    /// Looks up an example.
    ///
    /// # Panics
    ///
    /// Panics when `id` was issued by a different suite.
    #[must_use]
    pub fn example(&self, id: ExampleId) -> &Example {
        &self.examples[id.0]
    }

    /// Every example, in creation order.
    pub fn examples(&self) -> impl Iterator<Item = &Example> {
        self.examples.iter()
    }

    /// Number of examples in the suite.
    #[must_use]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Returns `true` when the suite holds no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Ancestors of `group` including itself, root first.
    #[must_use]
    pub fn chain(&self, group: GroupId) -> Vec<GroupId> {
        let mut chain: Vec<GroupId> =
            std::iter::successors(Some(group), |id| self.group(*id).parent()).collect();
        chain.reverse();
        chain
    }

    /// Every ancestor description plus the example's own, root first,
    /// joined by single spaces. Empty descriptions are skipped.
    #[must_use]
    pub fn full_description(&self, example: ExampleId) -> String {
        let leaf = self.example(example);
        self.chain(leaf.group())
            .into_iter()
            .map(|id| self.group(id).description())
            .chain([leaf.description()])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Finds the example whose fully qualified description is `description`.
    #[must_use]
    pub fn find_example(&self, description: &str) -> Option<ExampleId> {
        self.examples
            .iter()
            .map(Example::id)
            .find(|id| self.full_description(*id) == description)
    }
}
