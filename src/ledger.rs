//! Override ledger - operator-set and execute-once values (v0.1)
//!
//! Process-lifetime record, cleared at the start of each top-level
//! resolution request. The engine never persists it; callers serialize
//! `to_value()` however they like.

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::values::ParamName;

/// Record of every explicitly-set or execute-once value
#[derive(Debug, Clone, Default)]
pub struct OverrideLedger {
    overrides: FxHashMap<ParamName, Value>,
}

impl OverrideLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded overrides (start of a top-level request)
    pub fn reset(&mut self) {
        self.overrides.clear();
    }

    /// Record a value for a parameter (last write wins)
    pub fn record(&mut self, name: impl Into<ParamName>, value: Value) {
        self.overrides.insert(name.into(), value);
    }

    /// Get a recorded override
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.overrides.get(name)
    }

    /// Whether a parameter has a recorded override
    pub fn contains(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Serialize to a JSON object for caller-side persistence
    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.overrides).unwrap_or(Value::Null)
    }
}
