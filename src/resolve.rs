//! Fixed-point evaluator (v0.1)
//!
//! Repeated passes over unset published parameters, resolving any whose
//! effective dependencies are all valued, until a pass makes no progress.
//! Leftover unset parameters are not an error here; the interactive
//! resolver decides what to do with them.

use tracing::{debug, trace};

use crate::binding::Binding;
use crate::ledger::OverrideLedger;
use crate::store::BindingStore;
use crate::values::{DepValues, ParamName, ValueMap};

/// Outcome of the dependency-satisfaction check for one binding
pub(crate) enum DepCheck {
    /// All effective dependencies are valued; carries their values
    /// (union of static and dynamically-returned sets)
    Ready(DepValues),
    /// Still-unset dependency names, for diagnostics
    Waiting(Vec<ParamName>),
}

/// Check a binding's dependencies against the current values.
///
/// With a dynamic dependency function the static list gates its
/// invocation, and the *returned* set is what the value function waits
/// on; the static list is what diagnostics report while it is unmet.
pub(crate) fn check_deps(binding: &Binding, values: &ValueMap) -> DepCheck {
    let unset_static: Vec<ParamName> = binding
        .dependencies
        .iter()
        .filter(|dep| !values.is_set(dep))
        .cloned()
        .collect();

    let Some(dep_fn) = &binding.dependency_function else {
        if !unset_static.is_empty() {
            return DepCheck::Waiting(unset_static);
        }
        return DepCheck::Ready(values.collect(&binding.dependencies).unwrap_or_default());
    };

    // Dynamic dependencies: the function only runs once every static
    // dependency is valued
    if !unset_static.is_empty() {
        return DepCheck::Waiting(unset_static);
    }

    let static_values = values.collect(&binding.dependencies).unwrap_or_default();
    let effective = dep_fn.call(&static_values, None);

    let unset_effective: Vec<ParamName> =
        effective.iter().filter(|dep| !values.is_set(dep)).cloned().collect();
    if !unset_effective.is_empty() {
        return DepCheck::Waiting(unset_effective);
    }

    let mut dep_values = static_values;
    for name in effective {
        if let Some(value) = values.get(&name) {
            dep_values.insert(name, value.clone());
        }
    }
    DepCheck::Ready(dep_values)
}

/// Resolve every satisfiable parameter to a fixed point.
///
/// Never fails: parameters whose dependencies stay unmet, or which have
/// no function, are simply left unset.
pub fn resolve(store: &BindingStore, values: &mut ValueMap, ledger: &mut OverrideLedger) {
    let mut pass = 0usize;
    loop {
        pass += 1;
        let mut progress = false;

        for name in store.published_names() {
            if values.is_set(&name) {
                continue;
            }
            let Some(binding) = store.effective(&name) else {
                continue;
            };
            let DepCheck::Ready(dep_values) = check_deps(binding, values) else {
                continue;
            };
            let Some(function) = &binding.function else {
                continue;
            };

            let value = function.call(&dep_values, None);
            debug!(param = %name, pass, "resolved parameter");
            if binding.execute_once {
                ledger.record(name.clone(), value.clone());
            }
            values.set(name, value);
            progress = true;
        }

        trace!(pass, progress, "fixed-point pass complete");
        if !progress {
            break;
        }
    }
}
