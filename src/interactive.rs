//! Interactive resolution and revision (v0.1)
//!
//! Same dependency gating as the fixed-point evaluator, restricted to the
//! caller's promptable set, with "compute" replaced by "compute default,
//! then ask". Stalls are detected (two passes with the same still-unset
//! candidates) and reported with per-parameter diagnostics; the revision
//! loop, by contrast, terminates only on operator acceptance.

use serde_json::Value;
use tracing::debug;

use crate::console::Console;
use crate::error::{StrataError, StuckParam};
use crate::ledger::OverrideLedger;
use crate::resolve::{check_deps, DepCheck};
use crate::session::LOAD_FROM_PARAM;
use crate::store::BindingStore;
use crate::values::{ParamName, ValueMap};

/// Render a value for a prompt line (bare strings, JSON for the rest)
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve the promptable subset through the operator.
///
/// Candidates are visited in the caller-supplied order. A satisfied
/// candidate's default is computed exactly as the fixed-point evaluator
/// would; an empty response accepts it, anything else becomes the value
/// and is recorded in the ledger. When the reserved `load_from` parameter
/// is set non-empty, defaults are accepted silently without prompting.
pub fn interactively_resolve(
    store: &BindingStore,
    values: &mut ValueMap,
    promptable: &[ParamName],
    console: &dyn Console,
    ledger: &mut OverrideLedger,
) -> Result<(), StrataError> {
    let mut previous_unset: Option<Vec<ParamName>> = None;

    loop {
        let candidates: Vec<ParamName> = promptable
            .iter()
            .filter(|name| !values.is_set(name))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Ok(());
        }

        for name in &candidates {
            // Promptable parameters without a binding are treated as an
            // empty binding: no dependencies, no default
            let binding = store.effective(name).cloned().unwrap_or_default();

            let dep_values = match check_deps(&binding, values) {
                DepCheck::Ready(dep_values) => dep_values,
                DepCheck::Waiting(_) => continue,
            };

            let default = binding.function.as_ref().map(|f| f.call(&dep_values, None));

            if values.is_set_non_empty(LOAD_FROM_PARAM) {
                // Silent mode: accept computed defaults without prompting
                if let Some(value) = default {
                    debug!(param = %name, "accepted default silently");
                    if binding.execute_once {
                        ledger.record(name.clone(), value.clone());
                    }
                    values.set(name.clone(), value);
                }
                continue;
            }

            let prompt_text = match &default {
                Some(value) => format!("{} [{}]:", name, display_value(value)),
                None => format!("{name}:"),
            };
            let response = console.prompt(&prompt_text)?;

            if response.is_empty() {
                if let Some(value) = default {
                    if binding.execute_once {
                        ledger.record(name.clone(), value.clone());
                    }
                    values.set(name.clone(), value);
                }
                // No default and no response: stays unset, counted as visited
            } else {
                let value = Value::String(response);
                ledger.record(name.clone(), value.clone());
                values.set(name.clone(), value);
            }
        }

        let still_unset: Vec<ParamName> = candidates
            .iter()
            .filter(|name| !values.is_set(name))
            .cloned()
            .collect();

        if previous_unset.as_deref() == Some(still_unset.as_slice()) {
            return Err(StrataError::UnresolvableGraph {
                stuck: stuck_report(store, values, &still_unset),
            });
        }
        previous_unset = Some(still_unset);
    }
}

/// Build the per-parameter diagnostic payload for a stalled resolution
fn stuck_report(store: &BindingStore, values: &ValueMap, unset: &[ParamName]) -> Vec<StuckParam> {
    unset
        .iter()
        .map(|name| {
            let unset_dependencies = match store.effective(name) {
                Some(binding) => match check_deps(binding, values) {
                    DepCheck::Waiting(deps) => deps,
                    DepCheck::Ready(_) => Vec::new(),
                },
                None => Vec::new(),
            };
            StuckParam { name: name.clone(), unset_dependencies }
        })
        .collect()
}

/// Present the resolved map for operator review.
///
/// Immediate return when `auto_accept`. Otherwise the whole map is
/// announced and an empty response accepts it; anything else walks every
/// parameter for a replacement value (empty keeps the current one).
/// Termination is deliberately operator-controlled.
pub fn revise_interactively(
    auto_accept: bool,
    values: &mut ValueMap,
    console: &dyn Console,
    ledger: &mut OverrideLedger,
) -> Result<(), StrataError> {
    if auto_accept {
        return Ok(());
    }

    loop {
        console.announce("Resolved parameters:");
        for name in values.names() {
            let shown = values.get(&name).map(display_value).unwrap_or_default();
            console.announce(&format!("  {name} = {shown}"));
        }

        let response = console.prompt("Accept? (empty accepts, anything else revises)")?;
        if response.is_empty() {
            return Ok(());
        }

        for name in values.names() {
            let current = values.get(&name).cloned().unwrap_or(Value::Null);
            let response = console.prompt(&format!("{} [{}]:", name, display_value(&current)))?;
            if !response.is_empty() {
                let value = Value::String(response);
                ledger.record(name.clone(), value.clone());
                values.set(name, value);
            }
        }
    }
}
