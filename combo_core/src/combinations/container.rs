//! Solver-side load combination container.
//!
//! A structural solver receives the generated combinations through the
//! [`CombinationSink`] trait, one `(name, expression)` pair at a time. The
//! bundled [`LoadCombinationContainer`] parses each expression back into a
//! factor per load pattern.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Anything that can receive generated load combinations.
pub trait CombinationSink {
    /// Register a combination under `name` with a canonical expression
    fn new_load_combination(&mut self, name: &str, expression: &str) -> CalcResult<()>;
}

/// A combination as the solver stores it: a factor per load pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverCombination {
    pub name: String,
    /// Factors in expression order
    pub factors: Vec<(String, f64)>,
}

impl SolverCombination {
    /// Factor of a load pattern (0.0 if absent)
    pub fn factor(&self, pattern: &str) -> f64 {
        self.factors
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Check if this combination includes a load pattern with a non-zero factor
    pub fn includes(&self, pattern: &str) -> bool {
        self.factor(pattern).abs() > 1e-10
    }
}

/// Parse `coefficient*pattern(+coefficient*pattern)*` into factors.
///
/// # Example
/// ```
/// use combo_core::combinations::container::parse_expression;
///
/// let factors = parse_expression("1.35*G+1.5*LM71+0.9*W")?;
/// assert_eq!(factors[1], ("LM71".to_string(), 1.5));
/// # Ok::<(), combo_core::errors::CalcError>(())
/// ```
pub fn parse_expression(expression: &str) -> CalcResult<Vec<(String, f64)>> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(CalcError::invalid_input("expression", expression, "Empty combination expression"));
    }

    let mut factors: Vec<(String, f64)> = Vec::new();
    for term in split_terms(expression) {
        let term = term.trim();
        let (coefficient, pattern) = term.split_once('*').ok_or_else(|| {
            CalcError::invalid_input("expression", expression, format!("Term '{}' is not coefficient*pattern", term))
        })?;
        let coefficient: f64 = coefficient.trim().parse().map_err(|_| {
            CalcError::invalid_input("expression", expression, format!("Bad coefficient '{}'", coefficient))
        })?;
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(CalcError::invalid_input("expression", expression, "Missing load pattern"));
        }
        match factors.iter_mut().find(|(p, _)| p == pattern) {
            Some((_, f)) => *f += coefficient,
            None => factors.push((pattern.to_string(), coefficient)),
        }
    }
    Ok(factors)
}

/// Split on `+` separators, keeping exponent signs (`1e+2`) inside their term.
fn split_terms(expression: &str) -> Vec<&str> {
    let bytes = expression.as_bytes();
    let mut terms = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'+' || i == start {
            continue;
        }
        let exponent = matches!(bytes[i - 1], b'e' | b'E')
            && !expression[start..i].contains('*')
            && i >= 2
            && bytes[i - 2].is_ascii_digit();
        if !exponent {
            terms.push(&expression[start..i]);
            start = i + 1;
        }
    }
    terms.push(&expression[start..]);
    terms
}

/// In-memory container of solver combinations.
#[derive(Debug, Clone, Default)]
pub struct LoadCombinationContainer {
    /// Known load patterns; `None` accepts any pattern
    patterns: Option<BTreeSet<String>>,
    combinations: Vec<SolverCombination>,
    index: HashMap<String, usize>,
}

impl LoadCombinationContainer {
    /// Container accepting any load pattern
    pub fn new() -> Self {
        LoadCombinationContainer::default()
    }

    /// Container that rejects expressions naming unknown load patterns
    pub fn with_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LoadCombinationContainer {
            patterns: Some(patterns.into_iter().map(Into::into).collect()),
            ..LoadCombinationContainer::default()
        }
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SolverCombination> {
        self.index.get(name).map(|&i| &self.combinations[i])
    }

    /// Combinations in insertion order
    pub fn combinations(&self) -> &[SolverCombination] {
        &self.combinations
    }

    /// Combinations that include a load pattern
    pub fn including<'a>(&'a self, pattern: &'a str) -> impl Iterator<Item = &'a SolverCombination> + 'a {
        self.combinations.iter().filter(move |c| c.includes(pattern))
    }
}

impl CombinationSink for LoadCombinationContainer {
    fn new_load_combination(&mut self, name: &str, expression: &str) -> CalcResult<()> {
        if self.index.contains_key(name) {
            return Err(CalcError::invalid_input(
                "combination.name",
                name,
                "A combination with this name already exists",
            ));
        }
        let factors = parse_expression(expression)?;
        if let Some(patterns) = &self.patterns {
            if let Some((unknown, _)) = factors.iter().find(|(p, _)| !patterns.contains(p)) {
                return Err(CalcError::invalid_input(
                    format!("{}.expression", name),
                    unknown.as_str(),
                    "Unknown load pattern",
                ));
            }
        }

        self.index.insert(name.to_string(), self.combinations.len());
        self.combinations.push(SolverCombination {
            name: name.to_string(),
            factors,
        });
        Ok(())
    }
}

/// Collects `(name, expression)` pairs unchanged
impl CombinationSink for Vec<(String, String)> {
    fn new_load_combination(&mut self, name: &str, expression: &str) -> CalcResult<()> {
        self.push((name.to_string(), expression.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expression() {
        let factors = parse_expression("1.35*G+1.16*LM71_BRK+0.9*W").unwrap();
        assert_eq!(
            factors,
            vec![
                ("G".to_string(), 1.35),
                ("LM71_BRK".to_string(), 1.16),
                ("W".to_string(), 0.9),
            ]
        );
    }

    #[test]
    fn test_parse_negative_and_exponent() {
        let factors = parse_expression("1e+0*G+-1.5*W").unwrap();
        assert_eq!(factors, vec![("G".to_string(), 1.0), ("W".to_string(), -1.5)]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_expression("").is_err());
        assert!(parse_expression("1.35G").is_err());
        assert!(parse_expression("x*G").is_err());
        assert!(parse_expression("1.35*").is_err());
    }

    #[test]
    fn test_repeated_pattern_is_summed() {
        let factors = parse_expression("1.0*G+0.35*G").unwrap();
        assert_eq!(factors.len(), 1);
        assert!((factors[0].1 - 1.35).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut container = LoadCombinationContainer::new();
        container.new_load_combination("ULS1", "1.35*G").unwrap();
        assert!(container.new_load_combination("ULS1", "1.0*G").is_err());
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn test_unknown_pattern_rejected() {
        let mut container = LoadCombinationContainer::with_patterns(["G", "W"]);
        container.new_load_combination("ULS1", "1.35*G+1.5*W").unwrap();
        let err = container.new_load_combination("ULS2", "1.35*G+1.5*LM71").unwrap_err();
        assert!(err.to_string().contains("LM71"));
        assert!(container.get("ULS2").is_none());
    }

    #[test]
    fn test_including() {
        let mut container = LoadCombinationContainer::new();
        container.new_load_combination("SLSQP1", "1.0*G+0.5*T").unwrap();
        container.new_load_combination("SLSQP2", "1.0*G").unwrap();
        let names: Vec<&str> = container.including("T").map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["SLSQP1"]);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<(String, String)> = Vec::new();
        sink.new_load_combination("ULS1", "1.35*G").unwrap();
        assert_eq!(sink, vec![("ULS1".to_string(), "1.35*G".to_string())]);
    }
}
