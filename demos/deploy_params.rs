//! Example usage: two binding layers resolved through the terminal
//!
//! Run with `cargo run --example deploy_params` and answer the prompts
//! (empty input accepts the shown default). Set RUST_LOG=debug to watch
//! the resolution passes.

use serde_json::{json, Value};
use strata::{Binding, BindingGroup, InitialOverrides, ResolverSession, StdioConsole};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut session = ResolverSession::new(StdioConsole::new());

    // ========================================
    // Base layer: defaults for every deployment
    // ========================================

    session.merge_params(
        BindingGroup::named("base")
            .bind("region", Binding::constant(json!("eu-west-1")))
            .bind("instance_count", Binding::constant(json!("2")))
            .bind(
                "cluster_name",
                Binding::new().with_deps(["group", "region"]).with_function(|deps| {
                    json!(format!(
                        "{}-{}",
                        deps["group"].as_str().unwrap_or("?"),
                        deps["region"].as_str().unwrap_or("?")
                    ))
                }),
            )
            // No function: the operator has to supply it
            .bind("owner_email", Binding::new()),
    )?;

    // ========================================
    // Production layer: overrides and extensions
    // ========================================

    session.merge_params(
        BindingGroup::named("production")
            .bind("instance_count", Binding::constant(json!("6")))
            // Extends the base cluster name instead of replacing it
            .bind(
                "cluster_name",
                Binding::new().with_super_function(|deps, parent| {
                    let base = parent.map(|f| f.call(deps, None)).unwrap_or(Value::Null);
                    json!(format!("{}-prod", base.as_str().unwrap_or("cluster")))
                }),
            )
            // Only visible when deploying the production group
            .bind(
                "alert_channel",
                Binding::constant(json!("#ops-production")).unpublished(),
            ),
    )?;

    session.merge_group_functions()?;

    let values = session.get_arguments(
        InitialOverrides::new().confirming_defaults(),
        &["owner_email".to_string(), "region".to_string()],
    )?;

    println!("\nFinal configuration:");
    println!("{}", serde_json::to_string_pretty(&values.to_value())?);

    println!("\nOverrides to persist for the next run:");
    println!("{}", serde_json::to_string_pretty(&session.ledger().to_value())?);

    Ok(())
}
