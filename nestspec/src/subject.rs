//! Default subjects derived from a root group's description.
//!
//! When no group in an example's ancestry defines `subject`, the engine asks
//! the registered naming conventions for a factory matching the root group's
//! description. The lookup happens once, when the root group is defined. If
//! no convention matches, the subject is the root description itself.
//!
//! ```rust
//! use nestspec::{Runner, Suite, check_eq, select};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Widget {
//!     size: u8,
//! }
//!
//! let mut builder = Suite::builder();
//! builder.register_default_subject::<Widget>();
//! builder.describe("Widget", |widget| {
//!     widget.it("starts empty", |ctx| check_eq(ctx.subject::<Widget>()?.size, 0));
//! });
//! let suite = builder.build()?;
//! let report = Runner::new().run(&suite, &select(&suite, &[]));
//! assert!(report.is_success());
//! # Ok::<_, nestspec::BuildError>(())
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ExampleContext;
use crate::binding::{BindingDef, Value};

/// Builds the default subject for a described type.
#[derive(Clone)]
pub struct SubjectFactory(Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>);

impl SubjectFactory {
    /// Wraps a factory closure.
    #[must_use]
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self(Arc::new(move || Box::new(factory()) as Box<dyn Any>))
    }

    pub(crate) fn into_binding(self) -> BindingDef {
        BindingDef::Compute(Arc::new(move |_: &ExampleContext<'_>| {
            Ok(Value::from((self.0)()))
        }))
    }
}

impl fmt::Debug for SubjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubjectFactory(<fn>)")
    }
}

/// Maps a root group description to a default subject.
pub trait SubjectConvention: Send + Sync {
    /// Returns the factory for `description`, if this convention knows it.
    fn subject_for(&self, description: &str) -> Option<SubjectFactory>;
}

impl<F> SubjectConvention for F
where
    F: Fn(&str) -> Option<SubjectFactory> + Send + Sync,
{
    fn subject_for(&self, description: &str) -> Option<SubjectFactory> {
        self(description)
    }
}

/// Convention backed by explicit registrations.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    factories: HashMap<String, SubjectFactory>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for root groups described exactly `description`.
    pub fn register<T, F>(&mut self, description: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.factories
            .insert(description.into(), SubjectFactory::new(factory));
        self
    }

    /// Registers `T::default()` under `T`'s short type name.
    pub fn register_default<T>(&mut self) -> &mut Self
    where
        T: Any + Default,
    {
        self.register(short_type_name::<T>(), T::default)
    }

    /// Number of registered descriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl SubjectConvention for TypeRegistry {
    fn subject_for(&self, description: &str) -> Option<SubjectFactory> {
        self.factories.get(description).cloned()
    }
}

/// Last path segment of `T`'s name, without generic arguments.
///
/// `bank::Account` becomes `Account` and `Vec<u8>` becomes `Vec`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
