//! Value map - resolved parameter values (v0.1)
//!
//! Distinguishes "unset" (absent key, still eligible for resolution) from
//! "set to null" (a legitimate computed result that is not re-evaluated).
//!
//! Uses FxHashMap for faster hashing on small string keys.

use rustc_hash::FxHashMap;
use serde_json::Value;

/// A parameter name. Opaque; uniqueness per binding slot is the caller's contract.
pub type ParamName = String;

/// Map of dependency values handed to binding callables (name → value)
pub type DepValues = FxHashMap<ParamName, Value>;

/// Resolved parameter values (name → value)
#[derive(Debug, Clone, Default)]
pub struct ValueMap {
    resolved: FxHashMap<ParamName, Value>,
}

impl ValueMap {
    /// Create an empty map (every parameter unset)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter's value. Null is a real value, not "unset".
    pub fn set(&mut self, name: impl Into<ParamName>, value: Value) {
        self.resolved.insert(name.into(), value);
    }

    /// Get a parameter's value, or None if unset
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.resolved.get(name)
    }

    /// Whether the parameter has been given a value (null counts)
    pub fn is_set(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    /// Whether the parameter is set to a non-empty value
    /// (unset, null, and "" all count as empty)
    pub fn is_set_non_empty(&self, name: &str) -> bool {
        match self.resolved.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// All set parameter names, sorted for deterministic iteration
    pub fn names(&self) -> Vec<ParamName> {
        let mut names: Vec<ParamName> = self.resolved.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of set parameters
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Check if no parameter is set
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Collect the values of the given parameters; None if any is unset
    pub fn collect(&self, names: &[ParamName]) -> Option<DepValues> {
        let mut out = DepValues::default();
        for name in names {
            out.insert(name.clone(), self.resolved.get(name)?.clone());
        }
        Some(out)
    }

    /// Serialize to a JSON object for display or caller-side persistence
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.resolved).unwrap_or(Value::Null)
    }
}

impl FromIterator<(ParamName, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (ParamName, Value)>>(iter: T) -> Self {
        Self { resolved: iter.into_iter().collect() }
    }
}
