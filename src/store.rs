//! Binding store - layered merge and group folding (v0.1)
//!
//! Published bindings stack per parameter (last wins); `publish = false`
//! bindings are held aside per deploy-group value until
//! `merge_group_functions` folds the matching ones in. Super-chaining is
//! resolved here, at merge time, against the current effective binding.

use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::debug;

use crate::binding::{Binding, BindingGroup};
use crate::error::StrataError;
use crate::session::GROUP_PARAM;
use crate::values::{DepValues, ParamName};

/// Accumulates bindings across merge calls; grows monotonically
#[derive(Debug, Default)]
pub struct BindingStore {
    /// Parameter → ordered binding stack; the last element is effective
    published: FxHashMap<ParamName, Vec<Binding>>,
    /// Parameter → deploy-group value → binding (publish = false)
    group_scoped: FxHashMap<ParamName, FxHashMap<String, Binding>>,
    /// Set once `merge_group_functions` has folded; repeated calls are no-ops
    groups_merged: bool,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one group of bindings.
    ///
    /// The group's `group` entry is validated and filed first so that
    /// `publish = false` siblings are scoped under the group value this
    /// call establishes. Validation failures abort the merge with nothing
    /// filed.
    pub fn merge(&mut self, group: BindingGroup) -> Result<(), StrataError> {
        let entries = group.into_entries();

        let group_entries: Vec<&Binding> = entries
            .iter()
            .filter(|(name, _)| name == GROUP_PARAM)
            .map(|(_, b)| b)
            .collect();
        if group_entries.len() != 1 {
            return Err(StrataError::GroupEntryCount { count: group_entries.len() });
        }

        let group_binding = group_entries[0];
        if !group_binding.dependencies.is_empty() {
            return Err(StrataError::GroupHasDependencies {
                dependencies: group_binding.dependencies.clone(),
            });
        }

        // Resolve chaining for the group entry, then prove it yields a
        // usable group value before anything is filed.
        let effective_group = self.resolve_chaining(GROUP_PARAM, group_binding.clone());
        let current_group = group_value_of(&effective_group)?;

        debug!(group = %current_group, bindings = entries.len(), "merging binding group");

        self.published
            .entry(GROUP_PARAM.to_string())
            .or_default()
            .push(effective_group);

        for (name, binding) in entries {
            if name == GROUP_PARAM {
                continue;
            }
            self.submit(name, binding, &current_group);
        }

        Ok(())
    }

    /// Resolve `use_super` chaining and file one binding
    fn submit(&mut self, name: ParamName, binding: Binding, current_group: &str) {
        let published = binding.is_published();
        let filed = self.resolve_chaining(&name, binding);

        // The reserved group parameter is always published
        if published || name == GROUP_PARAM {
            self.published.entry(name).or_default().push(filed);
        } else {
            self.group_scoped
                .entry(name)
                .or_default()
                .insert(current_group.to_string(), filed);
        }
    }

    /// Chain onto the current effective binding when `use_super` is set;
    /// an empty binding stands in when the slot is vacant
    fn resolve_chaining(&self, name: &str, binding: Binding) -> Binding {
        if !binding.use_super {
            return binding;
        }
        match self.effective(name) {
            Some(parent) => binding.chained_onto(parent),
            None => binding.chained_onto(&Binding::new()),
        }
    }

    /// Fold group-scoped bindings matching the deploy-time group value
    /// onto the published stacks. Idempotent.
    pub fn merge_group_functions(&mut self) -> Result<(), StrataError> {
        if self.groups_merged {
            return Ok(());
        }

        let current_group = self.current_group_value()?;
        let mut folded = 0usize;

        for (name, per_group) in &self.group_scoped {
            if let Some(binding) = per_group.get(&current_group) {
                self.published.entry(name.clone()).or_default().push(binding.clone());
                folded += 1;
            }
        }

        debug!(group = %current_group, folded, "folded group-scoped bindings");
        self.groups_merged = true;
        Ok(())
    }

    /// Evaluate the published `group` binding's function with no inputs
    pub fn current_group_value(&self) -> Result<String, StrataError> {
        let binding = self.effective(GROUP_PARAM).ok_or(StrataError::EmptyGroupValue)?;
        group_value_of(binding)
    }

    /// The effective (last merged) binding for a parameter
    pub fn effective(&self, name: &str) -> Option<&Binding> {
        self.published.get(name).and_then(|stack| stack.last())
    }

    /// Number of stacked bindings for a parameter
    pub fn layer_count(&self, name: &str) -> usize {
        self.published.get(name).map(Vec::len).unwrap_or(0)
    }

    /// All published parameter names, sorted for deterministic passes
    pub fn published_names(&self) -> Vec<ParamName> {
        let mut names: Vec<ParamName> = self.published.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Evaluate a group binding's function with no inputs and require a
/// non-empty result
fn group_value_of(binding: &Binding) -> Result<String, StrataError> {
    let function = binding.function.as_ref().ok_or(StrataError::EmptyGroupValue)?;
    match function.call(&DepValues::default(), None) {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Null => Err(StrataError::EmptyGroupValue),
        Value::String(_) => Err(StrataError::EmptyGroupValue),
        other => Ok(other.to_string()),
    }
}
