//! # Factor Tables
//!
//! Partial safety factors (γ) and combination factors (ψ) keyed by name.
//!
//! A [`FactorTableSet`] is plain data: it is built once per design code (see
//! [`crate::codes`]) or loaded from a model file, and handed to a
//! [`crate::combinations::CombinationGenerator`]. Re-inserting a key
//! overwrites the previous row, which is how specialised tables override
//! generic entries.
//!
//! ## Example
//!
//! ```rust
//! use combo_core::factors::{
//!     CombinationFactors, FactorTableSet, PartialSafetyFactors, Sense, SituationClass,
//! };
//!
//! let mut tables = FactorTableSet::new();
//! tables.insert_partial_safety_factors("permanent", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0));
//! tables.insert_combination_factors("wind", CombinationFactors::new(0.6, 0.2, 0.0));
//!
//! let gamma = tables.partial_safety_factors("permanent").unwrap();
//! assert_eq!(gamma.factor(SituationClass::Persistent, Sense::Unfavorable), 1.35);
//! assert!(tables.combination_factors("snow").is_err());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::lint::LintWarning;

// ============================================================================
// Lookup Selectors
// ============================================================================

/// Which group of partial safety factors a design situation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SituationClass {
    /// ULS persistent and transient situations
    Persistent,
    /// ULS accidental and seismic situations
    Accidental,
    /// Serviceability limit states
    Serviceability,
}

/// Whether an action is taken with its favorable or unfavorable factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sense {
    Favorable,
    #[default]
    Unfavorable,
}

/// One of the three combination factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PsiFactor {
    /// ψ0 - combination value
    Combination,
    /// ψ1 - frequent value
    Frequent,
    /// ψ2 - quasi-permanent value
    QuasiPermanent,
}

impl PsiFactor {
    /// Short symbol (ψ0, ψ1, ψ2)
    pub fn symbol(&self) -> &'static str {
        match self {
            PsiFactor::Combination => "ψ0",
            PsiFactor::Frequent => "ψ1",
            PsiFactor::QuasiPermanent => "ψ2",
        }
    }
}

// ============================================================================
// Partial Safety Factors
// ============================================================================

/// Ultimate limit state partial safety factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UlsFactors {
    /// Favorable, persistent/transient situation
    pub favorable: f64,
    /// Unfavorable, persistent/transient situation
    pub unfavorable: f64,
    /// Favorable, accidental/seismic situation
    pub favorable_accidental: f64,
    /// Unfavorable, accidental/seismic situation
    pub unfavorable_accidental: f64,
}

/// Serviceability limit state partial safety factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlsFactors {
    pub favorable: f64,
    pub unfavorable: f64,
}

/// Partial safety factor row for one family of actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialSafetyFactors {
    pub uls: UlsFactors,
    pub sls: SlsFactors,
}

impl PartialSafetyFactors {
    /// Create a row from the four ULS factors followed by the two SLS ones.
    ///
    /// Argument order: ULS favorable, ULS unfavorable, ULS favorable
    /// accidental, ULS unfavorable accidental, SLS favorable, SLS unfavorable.
    pub fn new(
        uls_favorable: f64,
        uls_unfavorable: f64,
        uls_favorable_accidental: f64,
        uls_unfavorable_accidental: f64,
        sls_favorable: f64,
        sls_unfavorable: f64,
    ) -> Self {
        PartialSafetyFactors {
            uls: UlsFactors {
                favorable: uls_favorable,
                unfavorable: uls_unfavorable,
                favorable_accidental: uls_favorable_accidental,
                unfavorable_accidental: uls_unfavorable_accidental,
            },
            sls: SlsFactors {
                favorable: sls_favorable,
                unfavorable: sls_unfavorable,
            },
        }
    }

    /// Factor for a situation class and sense
    pub fn factor(&self, class: SituationClass, sense: Sense) -> f64 {
        match (class, sense) {
            (SituationClass::Persistent, Sense::Favorable) => self.uls.favorable,
            (SituationClass::Persistent, Sense::Unfavorable) => self.uls.unfavorable,
            (SituationClass::Accidental, Sense::Favorable) => self.uls.favorable_accidental,
            (SituationClass::Accidental, Sense::Unfavorable) => self.uls.unfavorable_accidental,
            (SituationClass::Serviceability, Sense::Favorable) => self.sls.favorable,
            (SituationClass::Serviceability, Sense::Unfavorable) => self.sls.unfavorable,
        }
    }

    /// (favorable, unfavorable) pairs for the three situation classes
    fn pairs(&self) -> [(&'static str, f64, f64); 3] {
        [
            ("ULS", self.uls.favorable, self.uls.unfavorable),
            ("ULS accidental", self.uls.favorable_accidental, self.uls.unfavorable_accidental),
            ("SLS", self.sls.favorable, self.sls.unfavorable),
        ]
    }
}

// ============================================================================
// Combination Factors
// ============================================================================

/// ψ0, ψ1, ψ2 for one kind of variable action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinationFactors {
    pub psi_0: f64,
    pub psi_1: f64,
    pub psi_2: f64,
}

impl CombinationFactors {
    pub fn new(psi_0: f64, psi_1: f64, psi_2: f64) -> Self {
        CombinationFactors { psi_0, psi_1, psi_2 }
    }

    /// Get one of the three factors
    pub fn get(&self, psi: PsiFactor) -> f64 {
        match psi {
            PsiFactor::Combination => self.psi_0,
            PsiFactor::Frequent => self.psi_1,
            PsiFactor::QuasiPermanent => self.psi_2,
        }
    }

    /// Whether 0 ≤ ψ2 ≤ ψ1 ≤ ψ0 ≤ 1 holds.
    ///
    /// Code tables do not always satisfy this (EN 1990 gives ψ0 = 0 with
    /// ψ1 = 0.75 for the gr1b traffic group), so it is only reported.
    pub fn is_ordered(&self) -> bool {
        0.0 <= self.psi_2 && self.psi_2 <= self.psi_1 && self.psi_1 <= self.psi_0 && self.psi_0 <= 1.0
    }
}

// ============================================================================
// Table Set
// ============================================================================

/// Named partial safety factor and combination factor rows for one code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorTableSet {
    /// Partial safety factor rows keyed by family name
    #[serde(default)]
    pub partial_safety_factors: BTreeMap<String, PartialSafetyFactors>,

    /// Combination factor rows keyed by action kind
    #[serde(default)]
    pub combination_factors: BTreeMap<String, CombinationFactors>,
}

impl FactorTableSet {
    pub fn new() -> Self {
        FactorTableSet::default()
    }

    /// Insert or overwrite a partial safety factor row
    pub fn insert_partial_safety_factors(&mut self, key: impl Into<String>, row: PartialSafetyFactors) {
        self.partial_safety_factors.insert(key.into(), row);
    }

    /// Insert or overwrite a combination factor row
    pub fn insert_combination_factors(&mut self, key: impl Into<String>, row: CombinationFactors) {
        self.combination_factors.insert(key.into(), row);
    }

    /// Add a partial safety factor row (builder pattern)
    pub fn with_partial_safety_factors(mut self, key: impl Into<String>, row: PartialSafetyFactors) -> Self {
        self.insert_partial_safety_factors(key, row);
        self
    }

    /// Add a combination factor row (builder pattern)
    pub fn with_combination_factors(mut self, key: impl Into<String>, psi_0: f64, psi_1: f64, psi_2: f64) -> Self {
        self.insert_combination_factors(key, CombinationFactors::new(psi_0, psi_1, psi_2));
        self
    }

    /// Look up a partial safety factor row
    pub fn partial_safety_factors(&self, key: &str) -> CalcResult<&PartialSafetyFactors> {
        self.partial_safety_factors
            .get(key)
            .ok_or_else(|| CalcError::unknown_partial_safety_factors(key))
    }

    /// Look up a combination factor row
    pub fn combination_factors(&self, key: &str) -> CalcResult<&CombinationFactors> {
        self.combination_factors
            .get(key)
            .ok_or_else(|| CalcError::unknown_combination_factors(key))
    }

    pub fn has_partial_safety_factors(&self, key: &str) -> bool {
        self.partial_safety_factors.contains_key(key)
    }

    pub fn has_combination_factors(&self, key: &str) -> bool {
        self.combination_factors.contains_key(key)
    }

    /// Overlay another table set; its rows win on key collisions.
    pub fn merge(&mut self, other: &FactorTableSet) {
        for (key, row) in &other.partial_safety_factors {
            self.partial_safety_factors.insert(key.clone(), *row);
        }
        for (key, row) in &other.combination_factors {
            self.combination_factors.insert(key.clone(), *row);
        }
    }

    /// Report rows that break the usual code conventions.
    ///
    /// Nothing here is an error: generation uses the tables as entered.
    pub fn lint(&self) -> Vec<LintWarning> {
        let mut warnings = Vec::new();

        for (key, row) in &self.partial_safety_factors {
            for (label, favorable, unfavorable) in row.pairs() {
                if favorable < 0.0 || unfavorable < 0.0 {
                    warnings.push(LintWarning::NegativeFactor {
                        key: key.clone(),
                        detail: format!("{} factors ({}, {})", label, favorable, unfavorable),
                    });
                }
                if favorable > unfavorable {
                    warnings.push(LintWarning::FavorableExceedsUnfavorable {
                        key: key.clone(),
                        limit_state: label.to_string(),
                        favorable,
                        unfavorable,
                    });
                }
            }
        }

        for (key, row) in &self.combination_factors {
            if row.psi_0 < 0.0 || row.psi_1 < 0.0 || row.psi_2 < 0.0 {
                warnings.push(LintWarning::NegativeFactor {
                    key: key.clone(),
                    detail: format!("ψ = ({}, {}, {})", row.psi_0, row.psi_1, row.psi_2),
                });
            }
            if !row.is_ordered() {
                warnings.push(LintWarning::PsiOrdering {
                    key: key.clone(),
                    psi_0: row.psi_0,
                    psi_1: row.psi_1,
                    psi_2: row.psi_2,
                });
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FactorTableSet {
        FactorTableSet::new()
            .with_partial_safety_factors("permanent", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0))
            .with_partial_safety_factors("variable", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
            .with_combination_factors("wind", 0.6, 0.2, 0.0)
            .with_combination_factors("thermal", 0.6, 0.6, 0.5)
    }

    #[test]
    fn test_partial_safety_factor_lookup() {
        let tables = sample();
        let row = tables.partial_safety_factors("variable").unwrap();
        assert_eq!(row.factor(SituationClass::Persistent, Sense::Unfavorable), 1.5);
        assert_eq!(row.factor(SituationClass::Persistent, Sense::Favorable), 0.0);
        assert_eq!(row.factor(SituationClass::Accidental, Sense::Unfavorable), 1.0);
        assert_eq!(row.factor(SituationClass::Serviceability, Sense::Unfavorable), 1.0);
    }

    #[test]
    fn test_unknown_keys() {
        let tables = sample();
        assert_eq!(
            tables.partial_safety_factors("prestress").unwrap_err(),
            CalcError::unknown_partial_safety_factors("prestress")
        );
        assert_eq!(
            tables.combination_factors("snow").unwrap_err(),
            CalcError::unknown_combination_factors("snow")
        );
    }

    #[test]
    fn test_psi_lookup() {
        let tables = sample();
        let wind = tables.combination_factors("wind").unwrap();
        assert_eq!(wind.get(PsiFactor::Combination), 0.6);
        assert_eq!(wind.get(PsiFactor::Frequent), 0.2);
        assert_eq!(wind.get(PsiFactor::QuasiPermanent), 0.0);
    }

    #[test]
    fn test_reinsert_overwrites() {
        let mut tables = sample();
        tables.insert_combination_factors("wind", CombinationFactors::new(0.75, 0.5, 0.0));
        assert_eq!(tables.combination_factors("wind").unwrap().psi_0, 0.75);
        assert_eq!(tables.combination_factors.len(), 2);
    }

    #[test]
    fn test_merge_overlays_rows() {
        let mut tables = sample();
        let overrides = FactorTableSet::new()
            .with_combination_factors("wind", 0.8, 0.0, 0.0)
            .with_combination_factors("snow", 0.5, 0.2, 0.0);
        tables.merge(&overrides);
        assert_eq!(tables.combination_factors("wind").unwrap().psi_0, 0.8);
        assert!(tables.has_combination_factors("snow"));
        assert!(tables.has_partial_safety_factors("permanent"));
    }

    #[test]
    fn test_lint_reports_psi_ordering() {
        let tables = sample().with_combination_factors("gr1b", 0.0, 0.75, 0.0);
        let warnings = tables.lint();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], LintWarning::PsiOrdering { key, .. } if key == "gr1b"));
    }

    #[test]
    fn test_lint_reports_favorable_above_unfavorable() {
        let tables = FactorTableSet::new()
            .with_partial_safety_factors("odd", PartialSafetyFactors::new(1.2, 1.0, 1.0, 1.0, 1.0, 1.0));
        let warnings = tables.lint();
        assert!(warnings
            .iter()
            .any(|w| matches!(w, LintWarning::FavorableExceedsUnfavorable { key, .. } if key == "odd")));
    }

    #[test]
    fn test_serialization() {
        let tables = sample();
        let json = serde_json::to_string(&tables).unwrap();
        let parsed: FactorTableSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tables);
    }
}
