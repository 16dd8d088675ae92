//! Shared example templates (`shared_examples`) and inclusion overrides.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::fmt;
use std::sync::Arc;

use crate::binding::BindingDef;
use crate::{BuildError, ExampleContext, GroupBuilder, Outcome, SourceLocation};

type TemplateBody = dyn Fn(&mut GroupBuilder<'_>) + Send + Sync;

/// A registered template: a re-invocable group body.
#[derive(Clone)]
pub(crate) struct SharedTemplate {
    location: SourceLocation,
    body: Arc<TemplateBody>,
}

impl SharedTemplate {
    /// Replays the template's definitions into `scope`.
    pub(crate) fn instantiate(&self, scope: &mut GroupBuilder<'_>) {
        (self.body)(scope);
    }
}

impl fmt::Debug for SharedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedTemplate")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Templates keyed by name.
#[derive(Debug, Default)]
pub(crate) struct TemplateRegistry {
    templates: HashMap<String, SharedTemplate>,
}

impl TemplateRegistry {
    pub(crate) fn register(
        &mut self,
        name: String,
        location: SourceLocation,
        body: Arc<TemplateBody>,
    ) -> Result<(), BuildError> {
        match self.templates.entry(name) {
            MapEntry::Occupied(existing) => Err(BuildError::DuplicateTemplate {
                name: existing.key().clone(),
                first: existing.get().location.clone(),
                second: location,
            }),
            MapEntry::Vacant(slot) => {
                slot.insert(SharedTemplate { location, body });
                Ok(())
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<SharedTemplate> {
        self.templates.get(name).cloned()
    }
}

/// Bindings applied on top of an included template.
///
/// Overrides are installed in the including scope after the template's own
/// definitions, so they win over the template's bindings of the same name.
///
/// ```rust
/// use nestspec::Overrides;
///
/// let overrides = Overrides::new()
///     .value("limit", 100_u32)
///     .binding("owner", |_| Ok(String::from("ada")));
/// assert_eq!(overrides.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    bindings: Vec<(String, BindingDef)>,
}

impl Overrides {
    /// Creates an empty set of overrides.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Adds a lazily computed binding.
    #[must_use]
    pub fn binding<T, F>(mut self, name: impl Into<String>, computation: F) -> Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        self.bindings
            .push((name.into(), BindingDef::compute(computation)));
        self
    }

    /// Adds a binding that yields a clone of `value`.
    #[must_use]
    pub fn value<T>(self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Clone + Send + Sync,
    {
        self.binding(name, move |_| Ok(value.clone()))
    }

    /// Number of override bindings.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` when no overrides were supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn apply(self, scope: &mut GroupBuilder<'_>) {
        for (name, definition) in self.bindings {
            scope.insert_binding(name, definition);
        }
    }
}
