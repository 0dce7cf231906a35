//! # Session integration tests
//!
//! End-to-end resolution through `ResolverSession` with a scripted
//! console:
//! - single-layer and two-layer merge scenarios
//! - override precedence and last-wins layering
//! - super-chaining delegation across layers
//! - deploy-group scoping of unpublished bindings
//! - dynamic dependency gating
//! - unresolvable-graph reporting

use serde_json::{json, Value};
use strata::{
    Binding, BindingGroup, InitialOverrides, ParamName, ResolverSession, ScriptedConsole,
    StrataError,
};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn promptable(names: &[&str]) -> Vec<ParamName> {
    names.iter().map(|s| s.to_string()).collect()
}

fn layer0() -> BindingGroup {
    BindingGroup::named("layer0")
        .bind("dep0", Binding::constant(json!("layer0:dep0")))
        .bind(
            "config",
            Binding::new().with_deps(["group", "dep0"]).with_function(|deps| {
                json!(format!(
                    "layer0:config with dependencies: group:'{}' dep0:'{}'",
                    deps["group"].as_str().unwrap(),
                    deps["dep0"].as_str().unwrap()
                ))
            }),
        )
}

fn layer1() -> BindingGroup {
    BindingGroup::named("layer1")
        .bind("dep1", Binding::constant(json!("layer1:dep1")))
        .bind(
            "config",
            Binding::new()
                .with_deps(["group", "dep0", "dep1"])
                .with_function(|deps| {
                    json!(format!(
                        "layer1:config with dependencies: group:'{}' dep0:'{}' dep1:'{}'",
                        deps["group"].as_str().unwrap(),
                        deps["dep0"].as_str().unwrap(),
                        deps["dep1"].as_str().unwrap()
                    ))
                }),
        )
}

// ============================================================================
// MERGE SCENARIOS
// ============================================================================

#[test]
fn scenario_single_layer_resolves_config() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session.merge_params(layer0()).unwrap();
    session.merge_group_functions().unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    assert_eq!(
        values.get("config"),
        Some(&json!(
            "layer0:config with dependencies: group:'layer0' dep0:'layer0:dep0'"
        ))
    );
}

#[test]
fn scenario_second_layer_overrides_but_keeps_undefined_parameters() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session.merge_params(layer0()).unwrap();
    session.merge_params(layer1()).unwrap();
    session.merge_group_functions().unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    // dep0 persists from layer0 because layer1 does not redefine it
    assert_eq!(
        values.get("config"),
        Some(&json!(
            "layer1:config with dependencies: group:'layer1' dep0:'layer0:dep0' dep1:'layer1:dep1'"
        ))
    );
}

// ============================================================================
// OVERRIDES AND LAYERING
// ============================================================================

#[test]
fn initial_override_beats_bound_function() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session.merge_params(layer0()).unwrap();

    let overrides = InitialOverrides::new()
        .set("dep0", "forced:dep0")
        .accepting_defaults();
    let values = session.get_arguments(overrides, &[]).unwrap();

    assert_eq!(values.get("dep0"), Some(&json!("forced:dep0")));
    assert_eq!(
        values.get("config"),
        Some(&json!(
            "layer0:config with dependencies: group:'layer0' dep0:'forced:dep0'"
        ))
    );
}

#[test]
fn super_chained_layer_observes_replaced_binding() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session
        .merge_params(
            BindingGroup::named("layer0").bind("banner", Binding::constant(json!("base"))),
        )
        .unwrap();
    session
        .merge_params(BindingGroup::named("layer1").bind(
            "banner",
            Binding::new().with_super_function(|deps, parent| {
                let inherited = parent.map(|f| f.call(deps, None)).unwrap_or(Value::Null);
                json!(format!("{} extended", inherited.as_str().unwrap_or("?")))
            }),
        ))
        .unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    assert_eq!(values.get("banner"), Some(&json!("base extended")));
}

#[test]
fn operator_override_feeds_dependents_and_ledger() {
    let console = ScriptedConsole::with_responses(vec!["operator:dep0"]);
    let mut session = ResolverSession::new(console);
    session.merge_params(layer0()).unwrap();

    let overrides = InitialOverrides::new().accepting_defaults();
    let values = session
        .get_arguments(overrides, &promptable(&["dep0"]))
        .unwrap();

    // dep0 resolved in the first automatic pass; no prompt for it
    assert_eq!(values.get("dep0"), Some(&json!("layer0:dep0")));
    assert!(session.console().prompts().is_empty());
    assert_eq!(values.to_value()["config"], json!(
        "layer0:config with dependencies: group:'layer0' dep0:'layer0:dep0'"
    ));

    // Without the automatic pass, the prompt decides and the ledger records
    let overrides = InitialOverrides::new();
    session.console().queue_response("");
    let values = session
        .get_arguments(overrides, &promptable(&["dep0"]))
        .unwrap();

    assert_eq!(values.get("dep0"), Some(&json!("operator:dep0")));
    assert_eq!(session.ledger().get("dep0"), Some(&json!("operator:dep0")));
    assert_eq!(
        values.get("config"),
        Some(&json!(
            "layer0:config with dependencies: group:'layer0' dep0:'operator:dep0'"
        ))
    );
}

// ============================================================================
// GROUP SCOPING
// ============================================================================

#[test]
fn unpublished_binding_visible_only_to_its_deploy_group() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session
        .merge_params(
            BindingGroup::named("layer0")
                .bind("secret", Binding::constant(json!("layer0:secret")).unpublished()),
        )
        .unwrap();
    session.merge_group_functions().unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    assert_eq!(values.get("secret"), Some(&json!("layer0:secret")));
}

#[test]
fn changing_deploy_group_before_folding_hides_scoped_binding() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session
        .merge_params(
            BindingGroup::named("layer0")
                .bind("secret", Binding::constant(json!("layer0:secret")).unpublished()),
        )
        .unwrap();
    // The deploy group moves on before group functions are folded
    session.merge_params(BindingGroup::named("layer1")).unwrap();
    session.merge_group_functions().unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    assert!(values.get("secret").is_none());
}

// ============================================================================
// DYNAMIC DEPENDENCIES
// ============================================================================

#[test]
fn dynamic_dependency_set_gates_evaluation() {
    let console = ScriptedConsole::with_responses(vec!["late-value"]);
    let mut session = ResolverSession::new(console);
    session
        .merge_params(
            BindingGroup::named("layer0")
                .bind("selector", Binding::constant(json!("late")))
                .bind(
                    "gated",
                    Binding::new()
                        .with_deps(["selector"])
                        .with_dep_function(|deps| {
                            vec![deps["selector"].as_str().unwrap().to_string()]
                        })
                        .with_function(|deps| {
                            json!(format!("saw {}", deps["late"].as_str().unwrap()))
                        }),
                ),
        )
        .unwrap();

    // Static dep (selector) resolves automatically, but "gated" must wait
    // for "late", which only the operator supplies
    let overrides = InitialOverrides::new().accepting_defaults();
    let values = session
        .get_arguments(overrides, &promptable(&["late"]))
        .unwrap();

    assert_eq!(values.get("gated"), Some(&json!("saw late-value")));
}

// ============================================================================
// FAILURE REPORTING
// ============================================================================

#[test]
fn unresolvable_graph_names_stuck_parameters_and_their_gaps() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session
        .merge_params(
            BindingGroup::named("layer0")
                .bind("credentials", Binding::new())
                .bind(
                    "connection",
                    Binding::new().with_deps(["credentials"]).with_function(|_| json!("c")),
                ),
        )
        .unwrap();

    // The operator never supplies "credentials" (scripted empty responses)
    let err = session
        .get_arguments(
            InitialOverrides::new(),
            &promptable(&["credentials", "connection"]),
        )
        .unwrap_err();

    let StrataError::UnresolvableGraph { stuck } = err else {
        panic!("expected UnresolvableGraph, got: {err}");
    };
    let names: Vec<&str> = stuck.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["credentials", "connection"]);
    assert_eq!(stuck[1].unset_dependencies, vec!["credentials"]);
}

#[test]
fn merge_without_group_entry_is_rejected() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    let err = session
        .merge_params(BindingGroup::new().bind("p", Binding::constant(json!(1))))
        .unwrap_err();
    assert!(matches!(err, StrataError::GroupEntryCount { count: 0 }));
}

// ============================================================================
// LEDGER AND MODES
// ============================================================================

#[test]
fn execute_once_values_are_exported_for_persistence() {
    let mut session = ResolverSession::new(ScriptedConsole::new());
    session
        .merge_params(
            BindingGroup::named("layer0")
                .bind("instance_id", Binding::constant(json!("i-1234")).execute_once()),
        )
        .unwrap();

    session
        .get_arguments(InitialOverrides::new().accepting_defaults(), &[])
        .unwrap();

    let exported = session.ledger().to_value();
    assert_eq!(exported["instance_id"], "i-1234");
}

#[test]
fn confirm_defaults_resolves_automatically_but_still_reviews() {
    // Defaults computed up front, then the revision loop runs: reject once,
    // change "dep0", accept
    let console = ScriptedConsole::with_responses(vec![
        "revise", // reject the presented map
        "",       // keep config
        "changed:dep0",
        "", // keep group
        "", // accept on re-presentation
    ]);
    let mut session = ResolverSession::new(console);
    session.merge_params(layer0()).unwrap();

    let values = session
        .get_arguments(InitialOverrides::new().confirming_defaults(), &[])
        .unwrap();

    assert_eq!(values.get("dep0"), Some(&json!("changed:dep0")));
    // config was computed before the revision; revision does not re-derive it
    assert_eq!(
        values.get("config"),
        Some(&json!(
            "layer0:config with dependencies: group:'layer0' dep0:'layer0:dep0'"
        ))
    );
    assert_eq!(session.ledger().get("dep0"), Some(&json!("changed:dep0")));
}
