//! # Load Combinations
//!
//! Generated load combinations grouped by design situation.
//!
//! - [`Situation`] - the six design situations (ULS persistent, accidental,
//!   seismic; SLS rare, frequent, quasi-permanent)
//! - [`Combination`] - an ordered list of `(action, coefficient)` terms
//! - [`CombinationSet`] - all combinations of one situation, in generation order
//! - [`CombinationGenerator`] - expands actions, relations and factor tables
//!   into combination sets
//! - [`CombinationWriter`] - renders the `1.35*G+1.5*Q` expressions
//!
//! ## Example
//!
//! ```rust
//! use combo_core::actions::{Action, ActionFamily};
//! use combo_core::codes::ec0_bridges;
//! use combo_core::combinations::CombinationGenerator;
//!
//! let mut generator = CombinationGenerator::new("EC0 road bridge", ec0_bridges());
//! generator.insert(ActionFamily::Permanent, Action::new("G", "Self weight"), None, "permanent")?;
//! generator.insert(
//!     ActionFamily::Variable,
//!     Action::new("W", "Wind"),
//!     Some("road_bridge_wind_persistent_situation"),
//!     "variable",
//! )?;
//!
//! let uls = generator.uls_persistent_combinations()?;
//! assert_eq!(uls.expressions(), vec!["1.35*G+1.5*W"]);
//! # Ok::<(), combo_core::errors::CalcError>(())
//! ```

pub mod container;
pub mod envelope;
pub mod generator;
pub mod selection;
pub mod writer;

pub use container::{parse_expression, CombinationSink, LoadCombinationContainer, SolverCombination};
pub use envelope::{
    all_results, find_governing_combination, find_governing_min_max, find_minimum_combination, ActionValues,
    GoverningResults,
};
pub use generator::{AccidentalVariableFactor, CombinationGenerator, GeneratorOptions, PermanentSense};
pub use writer::{CombinationRow, CombinationWriter, OutputFormat, WriterOptions};

use serde::{Deserialize, Serialize};

use crate::factors::{PsiFactor, SituationClass};

/// Design situation for which combinations are generated.
///
/// # Example
/// ```
/// use combo_core::combinations::Situation;
/// use combo_core::factors::PsiFactor;
///
/// assert_eq!(Situation::SlsFrequent.leading_psi(), Some(PsiFactor::Frequent));
/// assert_eq!(Situation::SlsFrequent.accompanying_psi(), PsiFactor::QuasiPermanent);
/// assert_eq!(Situation::UlsPersistent.name_prefix(), "ULS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    /// ULS persistent or transient (fundamental combination)
    UlsPersistent,
    /// ULS accidental
    UlsAccidental,
    /// ULS seismic
    UlsSeismic,
    /// SLS rare (characteristic)
    SlsRare,
    /// SLS frequent
    SlsFrequent,
    /// SLS quasi-permanent
    SlsQuasiPermanent,
}

impl Situation {
    /// All situations in standard order
    pub const ALL: [Situation; 6] = [
        Situation::UlsPersistent,
        Situation::UlsAccidental,
        Situation::UlsSeismic,
        Situation::SlsRare,
        Situation::SlsFrequent,
        Situation::SlsQuasiPermanent,
    ];

    /// Prefix of generated combination names
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Situation::UlsPersistent => "ULS",
            Situation::UlsAccidental => "ULSA",
            Situation::UlsSeismic => "ULSS",
            Situation::SlsRare => "SLSR",
            Situation::SlsFrequent => "SLSF",
            Situation::SlsQuasiPermanent => "SLSQP",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Situation::UlsPersistent => "ULS persistent/transient",
            Situation::UlsAccidental => "ULS accidental",
            Situation::UlsSeismic => "ULS seismic",
            Situation::SlsRare => "SLS rare",
            Situation::SlsFrequent => "SLS frequent",
            Situation::SlsQuasiPermanent => "SLS quasi-permanent",
        }
    }

    /// Short lowercase key, used for file names, model files and the CLI
    pub fn key(&self) -> &'static str {
        match self {
            Situation::UlsPersistent => "uls_persistent",
            Situation::UlsAccidental => "uls_accidental",
            Situation::UlsSeismic => "uls_seismic",
            Situation::SlsRare => "sls_rare",
            Situation::SlsFrequent => "sls_frequent",
            Situation::SlsQuasiPermanent => "sls_quasi_permanent",
        }
    }

    /// Parse a key produced by [`Situation::key`]
    pub fn from_key(key: &str) -> Option<Situation> {
        Situation::ALL.iter().copied().find(|s| s.key() == key)
    }

    pub fn is_uls(&self) -> bool {
        matches!(
            self,
            Situation::UlsPersistent | Situation::UlsAccidental | Situation::UlsSeismic
        )
    }

    /// Which partial safety factors apply
    pub fn class(&self) -> SituationClass {
        match self {
            Situation::UlsPersistent => SituationClass::Persistent,
            Situation::UlsAccidental | Situation::UlsSeismic => SituationClass::Accidental,
            Situation::SlsRare | Situation::SlsFrequent | Situation::SlsQuasiPermanent => {
                SituationClass::Serviceability
            }
        }
    }

    /// ψ applied to the leading variable action (`None` = full value).
    pub fn leading_psi(&self) -> Option<PsiFactor> {
        match self {
            Situation::SlsFrequent => Some(PsiFactor::Frequent),
            Situation::SlsQuasiPermanent => Some(PsiFactor::QuasiPermanent),
            _ => None,
        }
    }

    /// ψ applied to accompanying variable actions
    pub fn accompanying_psi(&self) -> PsiFactor {
        match self {
            Situation::UlsPersistent | Situation::SlsRare => PsiFactor::Combination,
            Situation::UlsAccidental
            | Situation::UlsSeismic
            | Situation::SlsFrequent
            | Situation::SlsQuasiPermanent => PsiFactor::QuasiPermanent,
        }
    }
}

impl std::fmt::Display for Situation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One weighted action of a combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationTerm {
    /// Action code
    pub action: String,
    /// Partial safety factor times the applicable ψ (or 1)
    pub coefficient: f64,
}

impl CombinationTerm {
    pub fn new(action: impl Into<String>, coefficient: f64) -> Self {
        CombinationTerm {
            action: action.into(),
            coefficient,
        }
    }

    /// The term contributes nothing
    pub fn is_null(&self) -> bool {
        self.coefficient == 0.0
    }
}

/// A generated load combination.
///
/// Terms keep the registration order of their actions. Actions taken with a
/// zero coefficient (e.g. wind with ψ2 = 0 in a quasi-permanent combination)
/// stay in `terms` and are left out of the expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    /// Identifier (e.g. "ULS1", "SLSF3")
    pub name: String,

    pub situation: Situation,

    /// Code of the leading action, if any
    pub leading: Option<String>,

    pub terms: Vec<CombinationTerm>,
}

impl Combination {
    /// Canonical expression, e.g. `1.35*G+1.5*Q1+0.9*W`
    pub fn expanded_name(&self) -> String {
        writer::format_expression(&self.terms, &WriterOptions::default())
    }

    /// Coefficient of an action (0.0 if absent)
    pub fn coefficient(&self, action: &str) -> f64 {
        self.terms
            .iter()
            .find(|t| t.action == action)
            .map(|t| t.coefficient)
            .unwrap_or(0.0)
    }

    /// Whether the action takes part in the combination (possibly at 0.0)
    pub fn contains(&self, action: &str) -> bool {
        self.terms.iter().any(|t| t.action == action)
    }

    /// Action codes in term order
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.action.as_str())
    }

    /// Terms with a non-zero coefficient
    pub fn active_terms(&self) -> impl Iterator<Item = &CombinationTerm> {
        self.terms.iter().filter(|t| !t.is_null())
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.expanded_name())
    }
}

/// Combinations of one situation in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationSet {
    pub situation: Situation,
    pub combinations: Vec<Combination>,
}

impl CombinationSet {
    pub fn new(situation: Situation) -> Self {
        CombinationSet {
            situation,
            combinations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Combination> {
        self.combinations.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Combination> {
        self.combinations.iter().find(|c| c.name == name)
    }

    /// Canonical expressions in generation order
    pub fn expressions(&self) -> Vec<String> {
        self.combinations.iter().map(|c| c.expanded_name()).collect()
    }
}

impl<'a> IntoIterator for &'a CombinationSet {
    type Item = &'a Combination;
    type IntoIter = std::slice::Iter<'a, Combination>;

    fn into_iter(self) -> Self::IntoIter {
        self.combinations.iter()
    }
}

/// Combination sets for all six situations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCombinations {
    pub uls_persistent: CombinationSet,
    pub uls_accidental: CombinationSet,
    pub uls_seismic: CombinationSet,
    pub sls_rare: CombinationSet,
    pub sls_frequent: CombinationSet,
    pub sls_quasi_permanent: CombinationSet,
}

impl GeneratedCombinations {
    pub fn get(&self, situation: Situation) -> &CombinationSet {
        match situation {
            Situation::UlsPersistent => &self.uls_persistent,
            Situation::UlsAccidental => &self.uls_accidental,
            Situation::UlsSeismic => &self.uls_seismic,
            Situation::SlsRare => &self.sls_rare,
            Situation::SlsFrequent => &self.sls_frequent,
            Situation::SlsQuasiPermanent => &self.sls_quasi_permanent,
        }
    }

    /// Sets in [`Situation::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = &CombinationSet> {
        Situation::ALL.into_iter().map(move |s| self.get(s))
    }

    /// Total number of combinations over all situations
    pub fn total(&self) -> usize {
        self.iter().map(|s| s.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combination {
        Combination {
            name: "SLSQP1".to_string(),
            situation: Situation::SlsQuasiPermanent,
            leading: None,
            terms: vec![
                CombinationTerm::new("G", 1.0),
                CombinationTerm::new("W", 0.0),
                CombinationTerm::new("T", 0.5),
            ],
        }
    }

    #[test]
    fn test_situation_keys_roundtrip() {
        for situation in Situation::ALL {
            assert_eq!(Situation::from_key(situation.key()), Some(situation));
        }
        assert_eq!(Situation::from_key("uls"), None);
    }

    #[test]
    fn test_situation_factors() {
        assert_eq!(Situation::UlsPersistent.leading_psi(), None);
        assert_eq!(Situation::UlsPersistent.accompanying_psi(), PsiFactor::Combination);
        assert_eq!(Situation::SlsRare.accompanying_psi(), PsiFactor::Combination);
        assert_eq!(Situation::UlsSeismic.accompanying_psi(), PsiFactor::QuasiPermanent);
        assert_eq!(Situation::UlsSeismic.class(), SituationClass::Accidental);
        assert_eq!(Situation::SlsFrequent.class(), SituationClass::Serviceability);
        assert!(Situation::UlsAccidental.is_uls());
        assert!(!Situation::SlsRare.is_uls());
    }

    #[test]
    fn test_null_terms_kept_but_not_written() {
        let combo = sample();
        assert!(combo.contains("W"));
        assert_eq!(combo.coefficient("W"), 0.0);
        assert_eq!(combo.coefficient("Q"), 0.0);
        assert!(!combo.contains("Q"));
        assert_eq!(combo.expanded_name(), "1.0*G+0.5*T");
        assert_eq!(combo.active_terms().count(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "SLSQP1: 1.0*G+0.5*T");
    }

    #[test]
    fn test_set_lookup() {
        let mut set = CombinationSet::new(Situation::SlsQuasiPermanent);
        set.combinations.push(sample());
        assert_eq!(set.len(), 1);
        assert!(set.get("SLSQP1").is_some());
        assert!(set.get("SLSQP2").is_none());
        assert_eq!(set.expressions(), vec!["1.0*G+0.5*T"]);
    }

    #[test]
    fn test_serialization() {
        let combo = sample();
        let json = serde_json::to_string(&combo).unwrap();
        let parsed: Combination = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, combo);
    }
}
