//! Error types with fix suggestions (v0.1)

use serde::Serialize;
use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// A parameter interactive resolution could not make progress on.
///
/// Carried by [`StrataError::UnresolvableGraph`] so an operator can spot
/// the missing or misordered binding without reading source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StuckParam {
    /// Name of the stuck parameter
    pub name: String,
    /// Its dependencies that were still unset when resolution stalled
    pub unset_dependencies: Vec<String>,
}

impl std::fmt::Display for StuckParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.unset_dependencies.is_empty() {
            write!(f, "{} (no default, no operator value)", self.name)
        } else {
            write!(f, "{} (waiting on: {})", self.name, self.unset_dependencies.join(", "))
        }
    }
}

fn format_stuck(stuck: &[StuckParam]) -> String {
    stuck.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum StrataError {
    // ─────────────────────────────────────────────────────────────
    // Merge validation errors (STRATA-010 to STRATA-012)
    // ─────────────────────────────────────────────────────────────

    #[error("STRATA-010: merge call must contain exactly one 'group' binding, found {count}")]
    GroupEntryCount { count: usize },

    #[error("STRATA-011: 'group' binding must not declare dependencies (found: {dependencies:?})")]
    GroupHasDependencies { dependencies: Vec<String> },

    #[error("STRATA-012: 'group' binding must produce a non-empty group value")]
    EmptyGroupValue,

    // ─────────────────────────────────────────────────────────────
    // Resolution errors (STRATA-020)
    // ─────────────────────────────────────────────────────────────

    #[error("STRATA-020: interactive resolution stalled, unresolvable parameters: {}", format_stuck(.stuck))]
    UnresolvableGraph { stuck: Vec<StuckParam> },

    // ─────────────────────────────────────────────────────────────
    // Console errors (STRATA-030)
    // ─────────────────────────────────────────────────────────────

    #[error("STRATA-030: console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixSuggestion for StrataError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            StrataError::GroupEntryCount { .. } => {
                Some("Include one binding named 'group' in every merge call")
            }
            StrataError::GroupHasDependencies { .. } => {
                Some("The 'group' binding must compute its value from no inputs")
            }
            StrataError::EmptyGroupValue => {
                Some("Give the 'group' binding a function returning a non-empty name")
            }
            StrataError::UnresolvableGraph { .. } => {
                Some("Bind or pre-set the listed dependencies, or add them to the promptable set")
            }
            StrataError::Io(_) => Some("Check the interaction channel is connected"),
        }
    }
}
