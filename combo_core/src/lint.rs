//! Consistency findings for factor tables and action relations.
//!
//! Lint warnings never stop generation. They point at declarations that are
//! legal but usually unintended: ψ factors out of the usual order, one-sided
//! incompatibility declarations (which the registry mirrors), patterns that
//! match nothing, and actions that can never appear in a combination.

use serde::{Deserialize, Serialize};

/// A single lint finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LintWarning {
    /// ψ factors do not satisfy 0 ≤ ψ2 ≤ ψ1 ≤ ψ0 ≤ 1
    PsiOrdering {
        key: String,
        psi_0: f64,
        psi_1: f64,
        psi_2: f64,
    },

    /// Favorable partial safety factor larger than the unfavorable one
    FavorableExceedsUnfavorable {
        key: String,
        limit_state: String,
        favorable: f64,
        unfavorable: f64,
    },

    /// A factor below zero
    NegativeFactor { key: String, detail: String },

    /// Incompatibility declared by only one of the two actions
    OneWayIncompatibility { action: String, other: String },

    /// A regex pattern that matches no registered action
    PatternMatchesNothing { action: String, pattern: String },

    /// Every main action of this action is incompatible with it
    UnreachableAction { action: String },
}

impl std::fmt::Display for LintWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LintWarning::PsiOrdering { key, psi_0, psi_1, psi_2 } => write!(
                f,
                "combination factors '{}' are not ordered: ψ0={}, ψ1={}, ψ2={}",
                key, psi_0, psi_1, psi_2
            ),
            LintWarning::FavorableExceedsUnfavorable { key, limit_state, favorable, unfavorable } => write!(
                f,
                "partial safety factors '{}' ({}): favorable {} > unfavorable {}",
                key, limit_state, favorable, unfavorable
            ),
            LintWarning::NegativeFactor { key, detail } => {
                write!(f, "negative factor in '{}': {}", key, detail)
            }
            LintWarning::OneWayIncompatibility { action, other } => write!(
                f,
                "'{}' is declared incompatible with '{}' but not the other way round (mirrored)",
                action, other
            ),
            LintWarning::PatternMatchesNothing { action, pattern } => {
                write!(f, "pattern '{}' on '{}' matches no action", pattern, action)
            }
            LintWarning::UnreachableAction { action } => write!(
                f,
                "'{}' is incompatible with all of its main actions and never appears",
                action
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_subject() {
        let warning = LintWarning::OneWayIncompatibility {
            action: "LM6".to_string(),
            other: "LM7".to_string(),
        };
        let text = warning.to_string();
        assert!(text.contains("LM6"));
        assert!(text.contains("LM7"));
    }

    #[test]
    fn test_serialization_tag() {
        let warning = LintWarning::UnreachableAction { action: "BRK".to_string() };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"UnreachableAction\""));
    }
}
