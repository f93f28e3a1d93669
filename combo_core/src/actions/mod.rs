//! # Actions
//!
//! An [`Action`] is a named load pattern (self weight, a traffic load model,
//! wind, an earthquake...) that takes part in load combinations. Its
//! [`ActionFamily`] decides the role it plays during generation, while its
//! [`ActionRelationships`] restrict which other actions it may be combined
//! with.
//!
//! ## Relations
//!
//! - **Incompatible**: the two actions never act together. Patterns are
//!   either an exact code (`"LM7"`) or a regular expression matched against
//!   the whole code (`"LM.*"` excludes every action starting with `LM`).
//! - **Main**: the action only appears together with at least one of its
//!   main actions (braking only with the traffic that brakes).
//!
//! ## Example
//!
//! ```rust
//! use combo_core::actions::Action;
//!
//! let braking = Action::new("LM71_BRK", "Braking of LM71")
//!     .with_main("LM71")
//!     .with_incompatible("SW.*");
//!
//! assert_eq!(braking.relationships.mains, vec!["LM71".to_string()]);
//! assert!(braking.relationships.incompatibles.contains(&"SW.*".to_string()));
//! ```

pub mod registry;

pub use registry::{ActionEntry, ActionRegistry, ResolvedRelations};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Role of an action during combination generation.
///
/// # Example
/// ```
/// use combo_core::actions::ActionFamily;
///
/// assert_eq!(ActionFamily::Variable.code(), "Q");
/// assert!(ActionFamily::Seismic.is_exceptional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFamily {
    /// G - present in every combination
    Permanent,
    /// Q - cycled as leading or accompanying action
    Variable,
    /// A - leads the ULS accidental situation
    Accidental,
    /// AE - leads the ULS seismic situation
    Seismic,
}

impl ActionFamily {
    pub const ALL: [ActionFamily; 4] = [
        ActionFamily::Permanent,
        ActionFamily::Variable,
        ActionFamily::Accidental,
        ActionFamily::Seismic,
    ];

    /// Conventional symbol (G, Q, A, AE)
    pub fn code(&self) -> &'static str {
        match self {
            ActionFamily::Permanent => "G",
            ActionFamily::Variable => "Q",
            ActionFamily::Accidental => "A",
            ActionFamily::Seismic => "AE",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActionFamily::Permanent => "Permanent action",
            ActionFamily::Variable => "Variable action",
            ActionFamily::Accidental => "Accidental action",
            ActionFamily::Seismic => "Seismic action",
        }
    }

    /// Accidental and seismic actions only appear in their own situation
    pub fn is_exceptional(&self) -> bool {
        matches!(self, ActionFamily::Accidental | ActionFamily::Seismic)
    }
}

impl std::fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Declared relations of one action. Patterns are kept as written and
/// resolved against the registry right before generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRelationships {
    /// Codes or anchored regex patterns of incompatible actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incompatibles: Vec<String>,

    /// Codes of main actions (any one of them suffices)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mains: Vec<String>,
}

impl ActionRelationships {
    pub fn is_empty(&self) -> bool {
        self.incompatibles.is_empty() && self.mains.is_empty()
    }
}

/// A load action identified by a short code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Short code used in combination expressions (e.g. "G", "LM71")
    pub code: String,

    /// Long description
    pub description: String,

    /// Incompatible and main actions
    #[serde(default)]
    pub relationships: ActionRelationships,

    /// Never taken as the leading action
    #[serde(default)]
    pub not_determinant: bool,
}

impl Action {
    /// Create an action with no relations
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Action {
            code: code.into(),
            description: description.into(),
            relationships: ActionRelationships::default(),
            not_determinant: false,
        }
    }

    /// Add an incompatibility pattern (builder pattern)
    pub fn with_incompatible(mut self, pattern: impl Into<String>) -> Self {
        self.relationships.incompatibles.push(pattern.into());
        self
    }

    /// Add a main action (builder pattern)
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.relationships.mains.push(main.into());
        self
    }

    /// Mark the action as never leading (builder pattern)
    pub fn not_determinant(mut self) -> Self {
        self.not_determinant = true;
        self
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Characters that make a relation pattern a regex
const REGEX_OPERATORS: &[char] = &['.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$', '\\'];

/// Whether a pattern is a plain action code (no regex operator).
///
/// Codes such as `Q-2` or `T#1` are literal even though `regex::escape`
/// would escape them.
pub fn is_literal(pattern: &str) -> bool {
    !pattern.contains(REGEX_OPERATORS)
}

/// Compile a relation pattern anchored to the whole action code.
pub fn compile_pattern(action: &str, pattern: &str) -> CalcResult<Regex> {
    if pattern.is_empty() {
        return Err(CalcError::invalid_pattern(action, pattern, "empty pattern"));
    }
    Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| CalcError::invalid_pattern(action, pattern, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_codes() {
        assert_eq!(ActionFamily::Permanent.code(), "G");
        assert_eq!(ActionFamily::Variable.code(), "Q");
        assert_eq!(ActionFamily::Accidental.code(), "A");
        assert_eq!(ActionFamily::Seismic.code(), "AE");
        assert!(!ActionFamily::Variable.is_exceptional());
    }

    #[test]
    fn test_builder() {
        let action = Action::new("LM7DF", "LM7 braking")
            .with_main("LM7")
            .with_incompatible("LM7FC")
            .not_determinant();
        assert_eq!(action.relationships.mains, vec!["LM7"]);
        assert_eq!(action.relationships.incompatibles, vec!["LM7FC"]);
        assert!(action.not_determinant);
    }

    #[test]
    fn test_literal_detection() {
        assert!(is_literal("LM71"));
        assert!(is_literal("Q_snow"));
        assert!(!is_literal("LM.*"));
        assert!(!is_literal("W(x|y)"));
        assert!(!is_literal("LM7[0-9]"));
        assert!(!is_literal(r"Q\d"));
        assert!(is_literal("Q-2"));
        assert!(is_literal("T#1"));
        assert!(is_literal("A&B~C"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let literal = compile_pattern("A", "LM7").unwrap();
        assert!(literal.is_match("LM7"));
        assert!(!literal.is_match("LM7DF"));
        assert!(!literal.is_match("XLM7"));

        let wildcard = compile_pattern("A", "LM.*").unwrap();
        assert!(wildcard.is_match("LM71"));
        assert!(wildcard.is_match("LM"));
        assert!(!wildcard.is_match("SLM71"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = compile_pattern("W", "LM(7").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATTERN");
        assert!(compile_pattern("W", "").is_err());
    }

    #[test]
    fn test_serialization_skips_empty_relations() {
        let action = Action::new("G", "Self weight");
        let json = serde_json::to_string(&action).unwrap();
        assert!(!json.contains("incompatibles"));
        let parsed: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, action);
    }
}
