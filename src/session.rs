//! Resolver session - top-level entry contract (v0.1)
//!
//! Owns the binding store, the override ledger, and the interaction
//! channel. One session spans the process; each `get_arguments` call is a
//! top-level resolution request that resets the ledger, builds a fresh
//! value map, and hands both back to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::binding::BindingGroup;
use crate::console::Console;
use crate::error::StrataError;
use crate::interactive::{interactively_resolve, revise_interactively};
use crate::ledger::OverrideLedger;
use crate::resolve::resolve;
use crate::store::BindingStore;
use crate::values::{ParamName, ValueMap};

/// Reserved parameter naming the deploy group; always published
pub const GROUP_PARAM: &str = "group";

/// Reserved parameter: set non-empty, it tells the interactive resolver
/// to accept computed defaults without prompting
pub const LOAD_FROM_PARAM: &str = "load_from";

/// Caller-supplied seed for a resolution request.
///
/// The mode flags are proper booleans here; parsing whatever external
/// representation exists (CLI flags, env) into them is the caller's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialOverrides {
    /// Pre-set parameter values, seeded into both the value map and the ledger
    pub values: Vec<(ParamName, Value)>,
    /// Resolve and accept every default without operator review
    pub accept_defaults: bool,
    /// Resolve defaults first, but still walk the operator through them
    pub confirm_defaults: bool,
}

impl InitialOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-set one parameter
    pub fn set(mut self, name: impl Into<ParamName>, value: impl Into<Value>) -> Self {
        self.values.push((name.into(), value.into()));
        self
    }

    /// Enable the accept-defaults-automatically mode
    pub fn accepting_defaults(mut self) -> Self {
        self.accept_defaults = true;
        self
    }

    /// Enable the attempt-defaults-then-confirm mode
    pub fn confirming_defaults(mut self) -> Self {
        self.confirm_defaults = true;
        self
    }
}

/// Process-lifetime resolution engine
pub struct ResolverSession<C: Console> {
    store: BindingStore,
    ledger: OverrideLedger,
    console: C,
}

impl<C: Console> ResolverSession<C> {
    pub fn new(console: C) -> Self {
        Self { store: BindingStore::new(), ledger: OverrideLedger::new(), console }
    }

    /// Validate and file one group of bindings
    pub fn merge_params(&mut self, group: BindingGroup) -> Result<(), StrataError> {
        self.store.merge(group)
    }

    /// Fold group-scoped bindings for the current deploy group (idempotent)
    pub fn merge_group_functions(&mut self) -> Result<(), StrataError> {
        self.store.merge_group_functions()
    }

    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    /// The ledger from the most recent request, for caller-side persistence
    pub fn ledger(&self) -> &OverrideLedger {
        &self.ledger
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run one top-level resolution request.
    ///
    /// Seeds the ledger and value map from `overrides`, runs the
    /// automatic evaluator (when either mode flag is set), the
    /// interactive resolver over `promptable`, the automatic evaluator
    /// again for newly-satisfiable parameters, and finally the revision
    /// loop. Validation and stall errors abort with no partial map.
    pub fn get_arguments(
        &mut self,
        overrides: InitialOverrides,
        promptable: &[ParamName],
    ) -> Result<ValueMap, StrataError> {
        debug!(
            overrides = overrides.values.len(),
            promptable = promptable.len(),
            accept_defaults = overrides.accept_defaults,
            confirm_defaults = overrides.confirm_defaults,
            "starting resolution request"
        );

        self.ledger.reset();
        let mut values = ValueMap::new();
        for (name, value) in &overrides.values {
            self.ledger.record(name.clone(), value.clone());
            values.set(name.clone(), value.clone());
        }

        if overrides.accept_defaults || overrides.confirm_defaults {
            resolve(&self.store, &mut values, &mut self.ledger);
        }

        interactively_resolve(
            &self.store,
            &mut values,
            promptable,
            &self.console,
            &mut self.ledger,
        )?;

        // Non-promptable parameters may have become satisfiable
        resolve(&self.store, &mut values, &mut self.ledger);

        revise_interactively(
            overrides.accept_defaults,
            &mut values,
            &self.console,
            &mut self.ledger,
        )?;

        debug!(resolved = values.len(), "resolution request complete");
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;
    use crate::console::ScriptedConsole;
    use serde_json::json;

    #[test]
    fn overrides_seed_values_and_ledger() {
        let mut session = ResolverSession::new(ScriptedConsole::new());
        session.merge_params(BindingGroup::named("layer0")).unwrap();

        let overrides = InitialOverrides::new().set("region", "us-east-2").accepting_defaults();
        let values = session.get_arguments(overrides, &[]).unwrap();

        assert_eq!(values.get("region"), Some(&json!("us-east-2")));
        assert_eq!(session.ledger().get("region"), Some(&json!("us-east-2")));
    }

    #[test]
    fn ledger_resets_between_requests() {
        let mut session = ResolverSession::new(ScriptedConsole::new());
        session.merge_params(BindingGroup::named("layer0")).unwrap();

        let first = InitialOverrides::new().set("a", "1").accepting_defaults();
        session.get_arguments(first, &[]).unwrap();
        assert!(session.ledger().contains("a"));

        let second = InitialOverrides::new().set("b", "2").accepting_defaults();
        session.get_arguments(second, &[]).unwrap();
        assert!(!session.ledger().contains("a"));
        assert!(session.ledger().contains("b"));
    }

    #[test]
    fn no_mode_flag_skips_the_first_automatic_pass() {
        let mut session = ResolverSession::new(ScriptedConsole::new());
        session
            .merge_params(
                BindingGroup::named("layer0").bind("auto", Binding::constant(json!("computed"))),
            )
            .unwrap();

        // Neither flag set: only the post-interactive pass runs, then the
        // revision loop (accepted by the scripted empty response)
        let values = session.get_arguments(InitialOverrides::new(), &[]).unwrap();
        assert_eq!(values.get("auto"), Some(&json!("computed")));
        assert!(!session.console().prompts().is_empty());
    }

    #[test]
    fn second_automatic_pass_catches_unlocked_parameters() {
        let mut session =
            ResolverSession::new(ScriptedConsole::with_responses(vec!["supplied", ""]));
        session
            .merge_params(
                BindingGroup::named("layer0")
                    .bind("manual", Binding::new())
                    .bind(
                        "downstream",
                        Binding::new().with_deps(["manual"]).with_function(|deps| {
                            json!(format!("got {}", deps["manual"].as_str().unwrap()))
                        }),
                    ),
            )
            .unwrap();

        // "downstream" is not promptable; it resolves in the second
        // automatic pass after the operator supplies "manual"
        let overrides = InitialOverrides::new().accepting_defaults();
        let values = session.get_arguments(overrides, &["manual".to_string()]).unwrap();

        assert_eq!(values.get("downstream"), Some(&json!("got supplied")));
    }
}
