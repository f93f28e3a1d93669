//! Evaluation of generated combinations.
//!
//! Given a characteristic value per action (an internal force, a reaction,
//! a deflection...), each combination yields a design value. The envelope
//! helpers pick the governing combinations of a set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Combination, CombinationSet};
use crate::errors::{CalcError, CalcResult};

/// Characteristic values of one effect, keyed by action code.
///
/// ## JSON Format
///
/// ```json
/// {
///   "label": "Midspan moment",
///   "values": {
///     "G": 1200.0,
///     "LM71": 2400.0
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionValues {
    /// What the values describe
    pub label: String,

    /// Characteristic value per action code
    pub values: HashMap<String, f64>,
}

impl ActionValues {
    pub fn new(label: impl Into<String>) -> Self {
        ActionValues {
            label: label.into(),
            values: HashMap::new(),
        }
    }

    /// Add or update a value (builder pattern)
    pub fn with_value(mut self, action: impl Into<String>, value: f64) -> Self {
        self.values.insert(action.into(), value);
        self
    }

    pub fn set_value(&mut self, action: impl Into<String>, value: f64) {
        self.values.insert(action.into(), value);
    }

    /// Value of an action, 0.0 if not set
    pub fn get(&self, action: &str) -> f64 {
        self.values.get(action).copied().unwrap_or(0.0)
    }

    /// Check if a value is defined (even if zero)
    pub fn has(&self, action: &str) -> bool {
        self.values.contains_key(action)
    }

    /// Every value must be finite
    pub fn validate(&self) -> CalcResult<()> {
        for (action, value) in &self.values {
            if !value.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("{}.{}", self.label, action),
                    value.to_string(),
                    "Characteristic value must be finite",
                ));
            }
        }
        Ok(())
    }
}

impl Combination {
    /// Design value of the combination.
    ///
    /// Actions without a value count as zero.
    ///
    /// # Example
    /// ```
    /// use combo_core::combinations::{ActionValues, Combination, CombinationTerm, Situation};
    ///
    /// let combo = Combination {
    ///     name: "ULS1".to_string(),
    ///     situation: Situation::UlsPersistent,
    ///     leading: Some("Q".to_string()),
    ///     terms: vec![CombinationTerm::new("G", 1.35), CombinationTerm::new("Q", 1.5)],
    /// };
    /// let values = ActionValues::new("M").with_value("G", 20.0).with_value("Q", 10.0);
    /// assert!((combo.apply(&values) - 42.0).abs() < 1e-9);
    /// ```
    pub fn apply(&self, values: &ActionValues) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(&t.action))
            .sum()
    }
}

/// Maximum design value and the combination producing it.
///
/// An empty set yields `(0.0, "")`.
pub fn find_governing_combination(values: &ActionValues, set: &CombinationSet) -> (f64, String) {
    set.iter()
        .map(|combo| (combo.apply(values), combo.name.clone()))
        .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0.0, String::new()))
}

/// Minimum design value and the combination producing it (uplift, stress
/// reversal).
pub fn find_minimum_combination(values: &ActionValues, set: &CombinationSet) -> (f64, String) {
    set.iter()
        .map(|combo| (combo.apply(values), combo.name.clone()))
        .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or((0.0, String::new()))
}

/// Both ends of the envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoverningResults {
    pub max_value: f64,
    pub max_combo: String,
    pub min_value: f64,
    pub min_combo: String,
}

/// Maximum and minimum in a single pass.
///
/// # Example
/// ```
/// use combo_core::actions::{Action, ActionFamily};
/// use combo_core::codes::ec0_buildings;
/// use combo_core::combinations::{find_governing_min_max, ActionValues, CombinationGenerator};
///
/// let mut generator = CombinationGenerator::new("roof", ec0_buildings());
/// generator.insert(ActionFamily::Permanent, Action::new("G", "Self weight"), None, "permanent")?;
/// generator.insert(ActionFamily::Variable, Action::new("W", "Wind"), Some("wind"), "variable")?;
///
/// let uls = generator.uls_persistent_combinations()?;
/// let values = ActionValues::new("Support reaction").with_value("G", 10.0).with_value("W", -30.0);
/// let results = find_governing_min_max(&values, &uls);
/// assert_eq!(results.min_combo, "ULS1");
/// # Ok::<(), combo_core::errors::CalcError>(())
/// ```
pub fn find_governing_min_max(values: &ActionValues, set: &CombinationSet) -> GoverningResults {
    if set.is_empty() {
        return GoverningResults {
            max_value: 0.0,
            max_combo: String::new(),
            min_value: 0.0,
            min_combo: String::new(),
        };
    }

    let mut max_value = f64::MIN;
    let mut max_combo = String::new();
    let mut min_value = f64::MAX;
    let mut min_combo = String::new();

    for combo in set {
        let value = combo.apply(values);
        if value > max_value {
            max_value = value;
            max_combo = combo.name.clone();
        }
        if value < min_value {
            min_value = value;
            min_combo = combo.name.clone();
        }
    }

    GoverningResults {
        max_value,
        max_combo,
        min_value,
        min_combo,
    }
}

/// Design value of every combination, in generation order
pub fn all_results(values: &ActionValues, set: &CombinationSet) -> Vec<(String, f64)> {
    set.iter().map(|combo| (combo.name.clone(), combo.apply(values))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinations::{CombinationTerm, Situation};

    fn combo(name: &str, terms: &[(&str, f64)]) -> Combination {
        Combination {
            name: name.to_string(),
            situation: Situation::UlsPersistent,
            leading: None,
            terms: terms.iter().map(|(a, c)| CombinationTerm::new(*a, *c)).collect(),
        }
    }

    fn set() -> CombinationSet {
        let mut set = CombinationSet::new(Situation::UlsPersistent);
        set.combinations.push(combo("ULS1", &[("G", 1.35), ("LM71", 1.45), ("W", 0.9)]));
        set.combinations.push(combo("ULS2", &[("G", 1.35), ("LM71", 1.16), ("W", 1.5)]));
        set.combinations.push(combo("ULS3", &[("G", 1.0), ("W", 1.5)]));
        set
    }

    #[test]
    fn test_apply() {
        let values = ActionValues::new("M").with_value("G", 100.0).with_value("LM71", 200.0);
        let c = &set().combinations[0];
        assert!((c.apply(&values) - (135.0 + 290.0)).abs() < 1e-9);
    }

    #[test]
    fn test_missing_value_is_zero() {
        let values = ActionValues::new("M").with_value("G", 100.0);
        assert!(!values.has("W"));
        assert!((set().combinations[2].apply(&values) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_governing() {
        let values = ActionValues::new("M")
            .with_value("G", 100.0)
            .with_value("LM71", 200.0)
            .with_value("W", 50.0);
        let (max, name) = find_governing_combination(&values, &set());
        assert_eq!(name, "ULS1");
        assert!((max - 470.0).abs() < 1e-9);
    }

    #[test]
    fn test_uplift() {
        let values = ActionValues::new("R")
            .with_value("G", 10.0)
            .with_value("W", -30.0);
        let (min, name) = find_minimum_combination(&values, &set());
        // 1.0*10 - 1.5*30 = -35
        assert_eq!(name, "ULS3");
        assert!((min + 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_max() {
        let values = ActionValues::new("R")
            .with_value("G", 10.0)
            .with_value("LM71", 40.0)
            .with_value("W", -30.0);
        let results = find_governing_min_max(&values, &set());
        assert_eq!(results.max_combo, "ULS1");
        assert_eq!(results.min_combo, "ULS3");
        assert_eq!(all_results(&values, &set()).len(), 3);
    }

    #[test]
    fn test_empty_set() {
        let values = ActionValues::new("M");
        let empty = CombinationSet::new(Situation::SlsRare);
        assert_eq!(find_governing_combination(&values, &empty), (0.0, String::new()));
        assert_eq!(find_governing_min_max(&values, &empty).max_combo, "");
    }

    #[test]
    fn test_validate() {
        assert!(ActionValues::new("M").with_value("G", 1.0).validate().is_ok());
        assert!(ActionValues::new("M").with_value("G", f64::INFINITY).validate().is_err());
    }
}
