//! Binding - a single parameter's definition (v0.1)
//!
//! A binding carries a static dependency list, an optional dynamic
//! dependency function, an optional value function, and three feature
//! flags (execute-once, super-chaining, publish). Bindings are immutable
//! once merged; super-chaining builds a *new* binding that wraps the
//! previous one's callables.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::values::{DepValues, ParamName};

/// A parameter's value function.
///
/// Receives the values of its effective dependencies, plus the parent
/// layer's callable when the binding was merged with super-chaining
/// (None otherwise, and for plain bindings always None).
#[derive(Clone)]
pub struct ValueFn(Arc<dyn Fn(&DepValues, Option<&ValueFn>) -> Value + Send + Sync>);

impl ValueFn {
    /// Wrap a plain function that ignores any parent layer
    pub fn new(f: impl Fn(&DepValues) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |deps, _| f(deps)))
    }

    /// Wrap a function that may delegate to the parent layer's callable
    pub fn with_super(
        f: impl Fn(&DepValues, Option<&ValueFn>) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke with dependency values and an optional parent callable
    pub fn call(&self, deps: &DepValues, parent: Option<&ValueFn>) -> Value {
        (self.0)(deps, parent)
    }

    /// Memoizing wrapper: first invocation computes and caches, later
    /// invocations within the same chain return the cached value.
    /// Used for execute-once parents in super-chains.
    pub(crate) fn memoized(&self) -> ValueFn {
        let inner = self.clone();
        let cache: Arc<OnceCell<Value>> = Arc::new(OnceCell::new());
        ValueFn::with_super(move |deps, parent| {
            cache.get_or_init(|| inner.call(deps, parent)).clone()
        })
    }
}

impl fmt::Debug for ValueFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueFn")
    }
}

/// A dynamic dependency function.
///
/// Receives the current values of the binding's *static* dependencies and
/// returns the real dependency set; the value function is not invoked
/// until every returned name is valued. The optional parent argument is
/// the previous layer's dependency function when super-chained.
#[derive(Clone)]
pub struct DepFn(Arc<dyn Fn(&DepValues, Option<&DepFn>) -> Vec<ParamName> + Send + Sync>);

impl DepFn {
    /// Wrap a plain dependency function
    pub fn new(f: impl Fn(&DepValues) -> Vec<ParamName> + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |deps, _| f(deps)))
    }

    /// Wrap a dependency function that may call through to the parent layer's
    pub fn with_super(
        f: impl Fn(&DepValues, Option<&DepFn>) -> Vec<ParamName> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke with static-dependency values and an optional parent function
    pub fn call(&self, deps: &DepValues, parent: Option<&DepFn>) -> Vec<ParamName> {
        (self.0)(deps, parent)
    }
}

impl fmt::Debug for DepFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DepFn")
    }
}

/// A parameter definition.
///
/// Exactly the five supported features exist as fields; anything else a
/// caller might want to attach simply has no place to go, which is the
/// compile-time form of the "unsupported key" validation.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    /// Static dependency list (may be empty)
    pub dependencies: Vec<ParamName>,
    /// Computes the real dependency set from the static dependencies' values
    pub dependency_function: Option<DepFn>,
    /// Produces the value; absent means "no default, must be supplied"
    pub function: Option<ValueFn>,
    /// Once produced, the value becomes an immutable ledger-recorded override
    pub execute_once: bool,
    /// Merge as an extension of the binding currently occupying this slot
    pub use_super: bool,
    /// Unset/true: globally visible; false: visible only to the defining group
    pub publish: Option<bool>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a binding whose function returns a constant
    pub fn constant(value: Value) -> Self {
        Self::new().with_function(move |_| value.clone())
    }

    /// Set the static dependency list
    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ParamName>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the value function (no super delegation)
    pub fn with_function(mut self, f: impl Fn(&DepValues) -> Value + Send + Sync + 'static) -> Self {
        self.function = Some(ValueFn::new(f));
        self
    }

    /// Set a value function that may delegate to the parent layer
    pub fn with_super_function(
        mut self,
        f: impl Fn(&DepValues, Option<&ValueFn>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.function = Some(ValueFn::with_super(f));
        self.use_super = true;
        self
    }

    /// Set the dynamic dependency function
    pub fn with_dep_function(
        mut self,
        f: impl Fn(&DepValues) -> Vec<ParamName> + Send + Sync + 'static,
    ) -> Self {
        self.dependency_function = Some(DepFn::new(f));
        self
    }

    /// Mark the produced value as an immutable, ledger-persisted override
    pub fn execute_once(mut self) -> Self {
        self.execute_once = true;
        self
    }

    /// Merge this binding as an extension of the current effective binding
    pub fn extending(mut self) -> Self {
        self.use_super = true;
        self
    }

    /// Restrict visibility to the deploy group this binding is merged under
    pub fn unpublished(mut self) -> Self {
        self.publish = Some(false);
        self
    }

    /// Whether the binding is globally visible (publish unset counts as true)
    pub fn is_published(&self) -> bool {
        self.publish.unwrap_or(true)
    }

    /// Compose this binding on top of `parent`, resolving `use_super`.
    ///
    /// Dependencies are unioned; dependency functions are unioned with the
    /// parent function passed through to the child; the value function
    /// receives the parent's callable (memoized if the parent is
    /// execute-once) as its super argument. The result is a plain binding
    /// with `use_super` cleared.
    pub(crate) fn chained_onto(&self, parent: &Binding) -> Binding {
        let mut dependencies = self.dependencies.clone();
        for dep in &parent.dependencies {
            if !dependencies.contains(dep) {
                dependencies.push(dep.clone());
            }
        }

        let dependency_function =
            match (self.dependency_function.clone(), parent.dependency_function.clone()) {
                (Some(child), Some(parent_fn)) => Some(DepFn::with_super(move |deps, _| {
                    let mut out = child.call(deps, Some(&parent_fn));
                    for name in parent_fn.call(deps, None) {
                        if !out.contains(&name) {
                            out.push(name);
                        }
                    }
                    out
                })),
                (Some(child), None) => Some(child),
                (None, parent_fn) => parent_fn,
            };

        let parent_callable = parent
            .function
            .clone()
            .map(|f| if parent.execute_once { f.memoized() } else { f });

        let function = match self.function.clone() {
            Some(child) => Some(ValueFn::with_super(move |deps, _| {
                child.call(deps, parent_callable.as_ref())
            })),
            // A super-chained binding without its own function keeps the parent's
            None => parent_callable,
        };

        Binding {
            dependencies,
            dependency_function,
            function,
            execute_once: self.execute_once,
            use_super: false,
            publish: self.publish,
        }
    }
}

/// An ordered group of bindings submitted in one merge call.
///
/// Every group must contain exactly one entry named `group` whose binding
/// has no dependencies and a non-empty function result; the store enforces
/// this at merge time.
#[derive(Debug, Clone, Default)]
pub struct BindingGroup {
    entries: Vec<(ParamName, Binding)>,
}

impl BindingGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a group with its `group` binding set to a constant name
    pub fn named(group_value: &str) -> Self {
        let value = Value::String(group_value.to_string());
        Self::new().bind(crate::session::GROUP_PARAM, Binding::constant(value))
    }

    /// Add a binding for a parameter (insertion order is preserved)
    pub fn bind(mut self, name: impl Into<ParamName>, binding: Binding) -> Self {
        self.entries.push((name.into(), binding));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ParamName, Binding)> {
        self.entries.iter()
    }

    pub(crate) fn into_entries(self) -> Vec<(ParamName, Binding)> {
        self.entries
    }
}
