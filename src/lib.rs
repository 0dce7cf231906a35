//! Strata - layered configuration parameter resolution
//!
//! Binding groups merge in sequence (last wins, with super-chaining back
//! into the replaced layer), deploy-group-scoped bindings fold in at
//! group-merge time, and the graph of parameter dependencies resolves to
//! a fixed point - automatically, or interactively through an injectable
//! console with stall detection and an operator-driven revision loop.

pub mod binding;
pub mod console;
pub mod error;
pub mod interactive;
pub mod ledger;
pub mod resolve;
pub mod session;
pub mod store;
pub mod values;

pub use binding::{Binding, BindingGroup, DepFn, ValueFn};
pub use console::{Console, ScriptedConsole, StdioConsole};
pub use error::{FixSuggestion, StrataError, StuckParam};
pub use interactive::{interactively_resolve, revise_interactively};
pub use ledger::OverrideLedger;
pub use resolve::resolve;
pub use session::{InitialOverrides, ResolverSession, GROUP_PARAM, LOAD_FROM_PARAM};
pub use store::BindingStore;
pub use values::{DepValues, ParamName, ValueMap};
