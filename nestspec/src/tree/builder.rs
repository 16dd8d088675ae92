//! Builders that assemble a [`Suite`].
//!
//! Assembly is two-phase: register shared templates and subject conventions
//! first, then define groups. Definition closures run immediately, but no
//! example, hook or binding is executed until a [`crate::Runner`] runs the
//! finished suite.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Action, Entry, Example, ExampleId, Group, GroupId, Hook, Suite};
use crate::binding::{BindingDef, SUBJECT};
use crate::shared::{Overrides, TemplateRegistry};
use crate::subject::{SubjectConvention, SubjectFactory, TypeRegistry};
use crate::{BuildError, ExampleContext, Outcome, SourceLocation};

/// Nodes and diagnostics accumulated while a suite is being defined.
#[derive(Default)]
struct Assembly {
    groups: Vec<Group>,
    examples: Vec<Example>,
    templates: TemplateRegistry,
    errors: Vec<BuildError>,
}

impl Assembly {
    fn push_group(
        &mut self,
        parent: Option<GroupId>,
        description: String,
        location: SourceLocation,
        inclusion_sites: Vec<SourceLocation>,
    ) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            id,
            parent,
            description,
            location,
            inclusion_sites,
            entries: Vec::new(),
            bindings: HashMap::new(),
            before: Vec::new(),
            after: Vec::new(),
            implicit_subject: None,
        });
        if let Some(parent_id) = parent {
            self.group_mut(parent_id).entries.push(Entry::Group(id));
        }
        id
    }

    fn push_example(
        &mut self,
        group: GroupId,
        description: String,
        location: SourceLocation,
        inclusion_sites: Vec<SourceLocation>,
        body: Option<Arc<Action>>,
        skip: Option<String>,
    ) -> ExampleId {
        let id = ExampleId(self.examples.len());
        self.examples.push(Example {
            id,
            group,
            description,
            location,
            inclusion_sites,
            body,
            skip,
        });
        self.group_mut(group).entries.push(Entry::Example(id));
        id
    }

    fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.0]
    }
}

/// Assembles a [`Suite`].
///
/// # Examples
///
/// ```rust
/// use nestspec::{Overrides, Suite, check};
///
/// let mut builder = Suite::builder();
/// builder.register_template("a positive amount", |group| {
///     group.it("is positive", |ctx| {
///         let amount = ctx.value::<i64>("amount")?;
///         check(amount > 0, format!("{amount} is not positive"))
///     });
/// });
/// builder.describe("Deposit", |deposit| {
///     deposit.include_shared("a positive amount", Overrides::new().value("amount", 10_i64));
/// });
/// let suite = builder.build()?;
/// assert_eq!(suite.len(), 1);
/// # Ok::<_, nestspec::BuildError>(())
/// ```
#[derive(Default)]
pub struct SuiteBuilder {
    assembly: Assembly,
    roots: Vec<GroupId>,
    subjects: TypeRegistry,
    conventions: Vec<Box<dyn SubjectConvention>>,
}

impl SuiteBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shared example template under `name`.
    ///
    /// The builder closure runs once per inclusion, against the including
    /// group, so every inclusion gets its own copy of the template's
    /// examples, hooks and bindings. Templates must be registered before the
    /// groups that include them are defined; registering a name twice is a
    /// build error.
    #[track_caller]
    pub fn register_template<F>(&mut self, name: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(&mut GroupBuilder<'_>) + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        if let Err(err) = self
            .assembly
            .templates
            .register(name.into(), location, Arc::new(builder))
        {
            self.assembly.errors.push(err);
        }
        self
    }

    /// Associates a default subject factory with a root group description.
    pub fn register_subject<T, F>(&mut self, description: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.subjects.register(description, factory);
        self
    }

    /// Registers `T::default()` as the subject of root groups described by
    /// `T`'s short type name (for example `Widget`).
    pub fn register_default_subject<T>(&mut self) -> &mut Self
    where
        T: Any + Default,
    {
        self.subjects.register_default::<T>();
        self
    }

    /// Adds a custom naming convention consulted after registered subjects.
    pub fn subject_convention(&mut self, convention: impl SubjectConvention + 'static) -> &mut Self {
        self.conventions.push(Box::new(convention));
        self
    }

    /// Defines a top-level group and runs `builder` to populate it.
    #[track_caller]
    pub fn define_group<F>(&mut self, description: impl Into<String>, builder: F) -> GroupId
    where
        F: FnOnce(&mut GroupBuilder<'_>),
    {
        let location = SourceLocation::caller();
        let text: String = description.into();
        let implicit_subject = self.implicit_subject_for(&text);
        let id = self.assembly.push_group(None, text, location, Vec::new());
        self.assembly.group_mut(id).implicit_subject = implicit_subject;
        self.roots.push(id);
        let mut group = GroupBuilder::new(&mut self.assembly, id, Vec::new(), Vec::new());
        builder(&mut group);
        id
    }

    /// Alias for [`Self::define_group`].
    #[track_caller]
    pub fn describe<F>(&mut self, description: impl Into<String>, builder: F) -> GroupId
    where
        F: FnOnce(&mut GroupBuilder<'_>),
    {
        self.define_group(description, builder)
    }

    /// Finalizes the suite.
    ///
    /// # Errors
    ///
    /// Returns every build error collected during assembly, aggregated when
    /// there is more than one.
    pub fn build(self) -> Result<Suite, BuildError> {
        let Self {
            assembly, roots, ..
        } = self;
        if let Some(err) = BuildError::try_aggregate(assembly.errors) {
            return Err(err);
        }
        let suite = Suite {
            groups: assembly.groups,
            examples: assembly.examples,
            roots,
        };
        tracing::debug!(
            groups = suite.groups.len(),
            examples = suite.examples.len(),
            "suite assembled"
        );
        Ok(suite)
    }

    fn implicit_subject_for(&self, description: &str) -> Option<BindingDef> {
        self.subjects
            .subject_for(description)
            .or_else(|| {
                self.conventions
                    .iter()
                    .find_map(|convention| convention.subject_for(description))
            })
            .map(SubjectFactory::into_binding)
    }
}

/// Mutable handle on one group during assembly.
pub struct GroupBuilder<'a> {
    assembly: &'a mut Assembly,
    group: GroupId,
    sites: Vec<SourceLocation>,
    in_flight: Vec<String>,
}

impl<'a> GroupBuilder<'a> {
    fn new(
        assembly: &'a mut Assembly,
        group: GroupId,
        sites: Vec<SourceLocation>,
        in_flight: Vec<String>,
    ) -> Self {
        Self {
            assembly,
            group,
            sites,
            in_flight,
        }
    }

    /// Identifier of the group being populated.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.group
    }

    /// Defines a nested group and runs `builder` to populate it.
    #[track_caller]
    pub fn define_group<F>(&mut self, description: impl Into<String>, builder: F) -> GroupId
    where
        F: FnOnce(&mut GroupBuilder<'_>),
    {
        let location = SourceLocation::caller();
        let id = self.assembly.push_group(
            Some(self.group),
            description.into(),
            location,
            self.sites.clone(),
        );
        let mut child = GroupBuilder::new(
            &mut *self.assembly,
            id,
            self.sites.clone(),
            self.in_flight.clone(),
        );
        builder(&mut child);
        id
    }

    /// Alias for [`Self::define_group`].
    #[track_caller]
    pub fn describe<F>(&mut self, description: impl Into<String>, builder: F) -> GroupId
    where
        F: FnOnce(&mut GroupBuilder<'_>),
    {
        self.define_group(description, builder)
    }

    /// Alias for [`Self::define_group`].
    #[track_caller]
    pub fn context<F>(&mut self, description: impl Into<String>, builder: F) -> GroupId
    where
        F: FnOnce(&mut GroupBuilder<'_>),
    {
        self.define_group(description, builder)
    }

    /// Defines an example.
    #[track_caller]
    pub fn define_example<F>(&mut self, description: impl Into<String>, body: F) -> ExampleId
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        self.assembly.push_example(
            self.group,
            description.into(),
            location,
            self.sites.clone(),
            Some(Arc::new(body)),
            None,
        )
    }

    /// Alias for [`Self::define_example`].
    #[track_caller]
    pub fn it<F>(&mut self, description: impl Into<String>, body: F) -> ExampleId
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.define_example(description, body)
    }

    /// Defines an example described only by its enclosing groups.
    #[track_caller]
    pub fn specify<F>(&mut self, body: F) -> ExampleId
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.define_example(String::new(), body)
    }

    /// Defines an example without a body; it reports `Pending`.
    #[track_caller]
    pub fn pending(&mut self, description: impl Into<String>) -> ExampleId {
        let location = SourceLocation::caller();
        self.assembly.push_example(
            self.group,
            description.into(),
            location,
            self.sites.clone(),
            None,
            None,
        )
    }

    /// Defines an example whose body is kept but never run.
    #[track_caller]
    pub fn skip<F>(
        &mut self,
        description: impl Into<String>,
        reason: impl Into<String>,
        body: F,
    ) -> ExampleId
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        self.assembly.push_example(
            self.group,
            description.into(),
            location,
            self.sites.clone(),
            Some(Arc::new(body)),
            Some(reason.into()),
        )
    }

    /// Defines a lazily evaluated, per-example memoized binding.
    ///
    /// Redefining `name` in the same group replaces the earlier definition;
    /// defining it in a nested group shadows it for that subtree.
    pub fn define_binding<T, F>(&mut self, name: impl Into<String>, computation: F) -> &mut Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        self.insert_binding(name.into(), BindingDef::compute(computation));
        self
    }

    /// Defines a binding that is resolved by a `before` hook of this group,
    /// so it is computed even when the example never reads it.
    #[track_caller]
    pub fn define_eager_binding<T, F>(
        &mut self,
        name: impl Into<String>,
        computation: F,
    ) -> &mut Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        let binding = name.into();
        self.define_binding(binding.clone(), computation);
        self.define_before_hook(move |ctx| ctx.resolve(&binding).map(drop))
    }

    /// Defines the subject for this subtree.
    pub fn define_subject<T, F>(&mut self, computation: F) -> &mut Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        self.define_binding(SUBJECT, computation)
    }

    /// Defines binding `name` and makes the subject an alias of it; both
    /// names share one memoized value.
    pub fn define_named_subject<T, F>(&mut self, name: impl Into<String>, computation: F) -> &mut Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        let target = name.into();
        self.define_binding(target.clone(), computation);
        self.insert_binding(SUBJECT.to_owned(), BindingDef::alias(target));
        self
    }

    /// Adds a hook run before every example in this subtree.
    #[track_caller]
    pub fn define_before_hook<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        let group = self.group;
        self.assembly.group_mut(group).before.push(Hook {
            location,
            action: Arc::new(hook),
        });
        self
    }

    /// Alias for [`Self::define_before_hook`].
    #[track_caller]
    pub fn before<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.define_before_hook(hook)
    }

    /// Adds a hook run after every example in this subtree, whatever the
    /// example's outcome.
    #[track_caller]
    pub fn define_after_hook<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let location = SourceLocation::caller();
        let group = self.group;
        self.assembly.group_mut(group).after.push(Hook {
            location,
            action: Arc::new(hook),
        });
        self
    }

    /// Alias for [`Self::define_after_hook`].
    #[track_caller]
    pub fn after<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&ExampleContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.define_after_hook(hook)
    }

    /// Splices a copy of the shared template `name` into this group, then
    /// applies `overrides` as bindings of this group.
    ///
    /// Unknown or self-including templates are recorded and reported by
    /// [`SuiteBuilder::build`].
    #[track_caller]
    pub fn include_shared(&mut self, name: &str, overrides: Overrides) -> &mut Self {
        let site = SourceLocation::caller();
        self.instantiate(self.group, name, site, overrides);
        self
    }

    /// Instantiates the shared template `name` inside a new nested group
    /// described `behaves like <name>`, keeping `overrides` out of this
    /// group's own bindings.
    #[track_caller]
    pub fn behaves_like(&mut self, name: &str, overrides: Overrides) -> GroupId {
        let site = SourceLocation::caller();
        let id = self.assembly.push_group(
            Some(self.group),
            format!("behaves like {name}"),
            site.clone(),
            self.sites.clone(),
        );
        self.instantiate(id, name, site, overrides);
        id
    }

    pub(crate) fn insert_binding(&mut self, name: String, definition: BindingDef) {
        let group = self.group;
        let bindings = &mut self.assembly.group_mut(group).bindings;
        if bindings.insert(name.clone(), definition).is_some() {
            tracing::trace!(binding = %name, "binding redefined in the same group");
        }
    }

    fn instantiate(&mut self, target: GroupId, name: &str, site: SourceLocation, overrides: Overrides) {
        if self.in_flight.iter().any(|entry| entry == name) {
            let chain: Vec<&str> = self
                .in_flight
                .iter()
                .map(String::as_str)
                .chain([name])
                .collect();
            self.assembly.errors.push(BuildError::RecursiveTemplate {
                name: name.to_owned(),
                chain: chain.join(" -> "),
            });
            return;
        }
        let Some(template) = self.assembly.templates.get(name) else {
            self.assembly.errors.push(BuildError::UnknownTemplate {
                name: name.to_owned(),
                location: site,
            });
            return;
        };

        let mut sites = self.sites.clone();
        sites.push(site);
        let mut in_flight = self.in_flight.clone();
        in_flight.push(name.to_owned());
        let mut scope = GroupBuilder::new(&mut *self.assembly, target, sites, in_flight);
        template.instantiate(&mut scope);
        overrides.apply(&mut scope);
        tracing::trace!(template = name, "shared examples included");
    }
}
