//! Per-example binding cache and resolver.

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::{BindingDef, SUBJECT, Value};
use crate::runner::{is_assertion_panic, panic_message};
use crate::{Example, ExampleId, Failure, GroupId, Outcome, ResolveError, Suite};

/// State owned by one example execution.
///
/// Bodies, hooks and binding computations receive the context to read
/// bindings. The cache starts empty for every example and is discarded when
/// the example completes, so no value ever leaks into another example.
pub struct ExampleContext<'s> {
    suite: &'s Suite,
    example: ExampleId,
    chain: &'s [GroupId],
    cache: RefCell<HashMap<BindingKey, Cached>>,
    resolving: RefCell<Vec<String>>,
}

/// Cache key: the group that defines the binding plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BindingKey {
    group: GroupId,
    name: String,
}

#[derive(Clone)]
enum Cached {
    Value(Value),
    Failed { kind: FailedKind, message: String },
}

#[derive(Debug, Clone, Copy)]
enum FailedKind {
    Assertion,
    Pending,
    Error,
}

enum Definition<'s> {
    Declared(&'s BindingDef),
    /// Implicit subject of a root group with no convention match.
    Description(&'s str),
}

impl Cached {
    fn failed(failure: &Failure) -> Self {
        let kind = match failure {
            Failure::Assertion(_) => FailedKind::Assertion,
            Failure::Pending(_) => FailedKind::Pending,
            Failure::Error(_) => FailedKind::Error,
        };
        Self::Failed {
            kind,
            message: failure.to_string(),
        }
    }

    fn replay(self, name: &str) -> Outcome<Value> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Failed {
                kind: FailedKind::Assertion,
                message,
            } => Err(Failure::Assertion(message)),
            Self::Failed {
                kind: FailedKind::Pending,
                message,
            } => Err(Failure::Pending(message)),
            Self::Failed {
                kind: FailedKind::Error,
                message,
            } => Err(ResolveError::BindingFailed {
                name: name.to_owned(),
                message,
            }
            .into()),
        }
    }
}

impl<'s> ExampleContext<'s> {
    /// Creates a context with an empty cache for `example`, whose ancestor
    /// groups are `chain` (root first).
    pub(crate) fn new(suite: &'s Suite, example: ExampleId, chain: &'s [GroupId]) -> Self {
        Self {
            suite,
            example,
            chain,
            cache: RefCell::new(HashMap::new()),
            resolving: RefCell::new(Vec::new()),
        }
    }

    /// Resolves `name` to its memoized, type-erased value.
    ///
    /// The nearest group defining `name` (innermost first) supplies the
    /// computation. It runs at most once per example; later reads return the
    /// cached value, or replay the cached failure. `subject` always resolves:
    /// without an explicit definition it falls back to the root group's
    /// implicit subject, then to the root description itself.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UndefinedBinding`] when no ancestor defines
    /// `name`, [`ResolveError::CyclicBinding`] when the computation reads
    /// itself, and whatever failure the computation produced.
    ///
    /// # Panics
    ///
    /// A panicking computation is recorded as a failed binding and the panic
    /// is resumed; later reads in the same example replay the failure
    /// without running the computation again.
    pub fn resolve(&self, name: &str) -> Outcome<Rc<dyn Any>> {
        let (group, definition) =
            self.lookup(name)
                .ok_or_else(|| ResolveError::UndefinedBinding {
                    name: name.to_owned(),
                    example: self.full_description(),
                })?;
        let key = BindingKey {
            group,
            name: name.to_owned(),
        };
        let cached = self.cache.borrow().get(&key).cloned();
        if let Some(entry) = cached {
            return entry.replay(name);
        }

        self.enter(name)?;
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| self.compute(&definition)));
        self.resolving.borrow_mut().pop();
        let computed = match attempt {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let kind = if is_assertion_panic(&message) {
                    FailedKind::Assertion
                } else {
                    FailedKind::Error
                };
                tracing::trace!(binding = name, "binding computation panicked");
                self.cache
                    .borrow_mut()
                    .insert(key, Cached::Failed { kind, message });
                panic::resume_unwind(payload)
            }
        };

        let entry = match &computed {
            Ok(value) => Cached::Value(Rc::clone(value)),
            Err(failure) => Cached::failed(failure),
        };
        self.cache.borrow_mut().insert(key, entry);
        tracing::trace!(binding = name, ok = computed.is_ok(), "binding computed");
        computed
    }

    /// Resolves `name` and downcasts it to `T`.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::resolve`], or with
    /// [`ResolveError::BindingTypeMismatch`] when the value is not a `T`.
    pub fn get<T: Any>(&self, name: &str) -> Outcome<Rc<T>> {
        self.resolve(name)?.downcast::<T>().map_err(|_| {
            ResolveError::BindingTypeMismatch {
                name: name.to_owned(),
                expected: type_name::<T>(),
            }
            .into()
        })
    }

    /// Resolves `name` and clones the value out of the cache.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::get`].
    pub fn value<T: Any + Clone>(&self, name: &str) -> Outcome<T> {
        self.get::<T>(name).map(|value| T::clone(&value))
    }

    /// Resolves the subject binding.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::get`].
    pub fn subject<T: Any>(&self) -> Outcome<Rc<T>> {
        self.get(SUBJECT)
    }

    /// Returns `true` when `name` has already been computed in this example.
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|(group, _)| {
            self.cache.borrow().contains_key(&BindingKey {
                group,
                name: name.to_owned(),
            })
        })
    }

    /// The running example.
    #[must_use]
    pub fn example(&self) -> &'s Example {
        self.suite.example(self.example)
    }

    /// The running example's own description.
    #[must_use]
    pub fn description(&self) -> &'s str {
        self.example().description()
    }

    /// Ancestor groups of the running example, root first.
    #[must_use]
    pub const fn chain(&self) -> &'s [GroupId] {
        self.chain
    }

    /// Fully qualified description of the running example.
    #[must_use]
    pub fn full_description(&self) -> String {
        self.suite.full_description(self.example)
    }

    fn compute(&self, definition: &Definition<'s>) -> Outcome<Value> {
        match *definition {
            Definition::Declared(BindingDef::Compute(computation)) => computation(self),
            Definition::Declared(BindingDef::Alias(target)) => self.resolve(target),
            Definition::Description(text) => Ok(Rc::new(text.to_owned()) as Value),
        }
    }

    fn lookup(&self, name: &str) -> Option<(GroupId, Definition<'s>)> {
        let suite = self.suite;
        let declared = self.chain.iter().rev().find_map(|&id| {
            suite
                .group(id)
                .binding(name)
                .map(|def| (id, Definition::Declared(def)))
        });
        if declared.is_some() || name != SUBJECT {
            return declared;
        }
        let root_id = *self.chain.first()?;
        let root = suite.group(root_id);
        let definition = root
            .implicit_subject()
            .map_or(Definition::Description(root.description()), Definition::Declared);
        Some((root_id, definition))
    }

    fn enter(&self, name: &str) -> Outcome {
        let mut stack = self.resolving.borrow_mut();
        if let Some(start) = stack.iter().position(|entry| entry == name) {
            let cycle: Vec<&str> = stack
                .iter()
                .skip(start)
                .map(String::as_str)
                .chain([name])
                .collect();
            return Err(ResolveError::CyclicBinding {
                cycle: cycle.join(" -> "),
            }
            .into());
        }
        stack.push(name.to_owned());
        Ok(())
    }
}
