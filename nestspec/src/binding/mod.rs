//! Lazily evaluated, per-example memoized bindings (`let` / `subject`).
//!
//! Groups store [`BindingDef`]s keyed by name. Nothing is evaluated while a
//! suite is assembled; an [`ExampleContext`] resolves a binding the first
//! time the example (or one of its hooks) reads it and keeps the value for
//! the rest of that example only.

mod context;

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

pub use context::ExampleContext;

use crate::Outcome;

/// Name of the distinguished subject binding.
pub const SUBJECT: &str = "subject";

/// Type-erased memoized value.
pub(crate) type Value = Rc<dyn Any>;

type Computation = dyn Fn(&ExampleContext<'_>) -> Outcome<Value> + Send + Sync;

/// How a binding produces its value.
#[derive(Clone)]
pub(crate) enum BindingDef {
    /// Run a computation, memoizing its result.
    Compute(Arc<Computation>),
    /// Forward to another binding (named subjects).
    Alias(String),
}

impl BindingDef {
    pub(crate) fn compute<T, F>(computation: F) -> Self
    where
        T: Any,
        F: Fn(&ExampleContext<'_>) -> Outcome<T> + Send + Sync + 'static,
    {
        Self::Compute(Arc::new(move |ctx: &ExampleContext<'_>| {
            computation(ctx).map(|value| Rc::new(value) as Value)
        }))
    }

    pub(crate) fn alias(target: impl Into<String>) -> Self {
        Self::Alias(target.into())
    }
}

impl fmt::Debug for BindingDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute(_) => f.write_str("Compute(<fn>)"),
            Self::Alias(target) => f.debug_tuple("Alias").field(target).finish(),
        }
    }
}
