//! Action registry and relation resolution.
//!
//! Registration and resolution are two separate phases. While actions are
//! being declared, relations are stored as written (regex patterns may name
//! actions that are registered later). [`ActionRegistry::resolve`] then
//! matches every pattern against the final catalog and produces a
//! [`ResolvedRelations`] graph indexed by registration order, which is what
//! the generator works with.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{compile_pattern, is_literal, Action, ActionFamily};
use crate::errors::{CalcError, CalcResult};
use crate::lint::LintWarning;

/// A registered action with its family and factor table keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub action: Action,
    pub family: ActionFamily,
    /// Key into the partial safety factor table
    pub partial_safety_factors: String,
    /// Key into the combination factor table (required for variable actions)
    pub combination_factors: Option<String>,
}

impl ActionEntry {
    pub fn code(&self) -> &str {
        &self.action.code
    }
}

/// Catalog of actions in registration order.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    entries: Vec<ActionEntry>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub fn get(&self, code: &str) -> Option<&ActionEntry> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    /// Registration index of an action
    pub fn position(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Indices of the actions of one family, in registration order
    pub fn family_indices(&self, family: ActionFamily) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.family == family)
            .map(|(i, _)| i)
            .collect()
    }

    /// Register an action. Factor keys are checked by the caller.
    pub fn insert(&mut self, entry: ActionEntry) -> CalcResult<usize> {
        let code = entry.action.code.clone();
        if code.trim().is_empty() {
            return Err(CalcError::invalid_input("action.code", code, "Action code cannot be empty"));
        }
        if self.index.contains_key(&code) {
            return Err(CalcError::duplicate_action(code));
        }
        for pattern in &entry.action.relationships.incompatibles {
            compile_pattern(&code, pattern)?;
        }
        for main in &entry.action.relationships.mains {
            check_main(&code, main)?;
        }

        let position = self.entries.len();
        self.index.insert(code, position);
        self.entries.push(entry);
        Ok(position)
    }

    fn entry_mut(&mut self, code: &str, relation: &str) -> CalcResult<&mut ActionEntry> {
        match self.index.get(code) {
            Some(&i) => Ok(&mut self.entries[i]),
            None => Err(CalcError::unknown_owner(code, relation)),
        }
    }

    /// Declare `code` incompatible with every action matching `pattern`.
    pub fn append_incompatible(&mut self, code: &str, pattern: &str) -> CalcResult<()> {
        compile_pattern(code, pattern)?;
        let entry = self.entry_mut(code, "incompatible")?;
        entry.action.relationships.incompatibles.push(pattern.to_string());
        Ok(())
    }

    /// Declare `main` as one of the main actions of `code`.
    pub fn append_main(&mut self, code: &str, main: &str) -> CalcResult<()> {
        check_main(code, main)?;
        let entry = self.entry_mut(code, "main")?;
        entry.action.relationships.mains.push(main.to_string());
        Ok(())
    }

    pub fn set_not_determinant(&mut self, code: &str, not_determinant: bool) -> CalcResult<()> {
        self.entry_mut(code, "not_determinant")?.action.not_determinant = not_determinant;
        Ok(())
    }

    /// Match every relation against the current catalog.
    ///
    /// Exact codes that name no registered action are configuration errors;
    /// regex patterns that match nothing are only logged. Incompatibility is
    /// made symmetric.
    pub fn resolve(&self) -> CalcResult<ResolvedRelations> {
        let n = self.entries.len();
        let mut incompatible = vec![BTreeSet::new(); n];
        let mut declared = BTreeSet::new();
        let mut empty_patterns = Vec::new();
        let mut mains = vec![Vec::new(); n];

        for (i, entry) in self.entries.iter().enumerate() {
            let code = entry.code();

            for pattern in &entry.action.relationships.incompatibles {
                let regex = compile_pattern(code, pattern)?;
                let mut matched = false;
                for (j, other) in self.entries.iter().enumerate() {
                    if !regex.is_match(other.code()) {
                        continue;
                    }
                    matched = true;
                    if i == j {
                        continue;
                    }
                    declared.insert((i, j));
                    incompatible[i].insert(j);
                    incompatible[j].insert(i);
                }
                if !matched {
                    if is_literal(pattern) {
                        return Err(CalcError::unknown_action(code, "incompatible", pattern.as_str()));
                    }
                    log::warn!("pattern '{}' on action '{}' matches no action", pattern, code);
                    empty_patterns.push((i, pattern.clone()));
                }
            }

            for main in &entry.action.relationships.mains {
                match self.index.get(main) {
                    Some(&j) => {
                        if !mains[i].contains(&j) {
                            mains[i].push(j);
                        }
                    }
                    None => return Err(CalcError::unknown_action(code, "main", main.as_str())),
                }
            }
            mains[i].sort_unstable();
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if entry.family != ActionFamily::Permanent {
                continue;
            }
            if let Some(&j) = incompatible[i]
                .iter()
                .find(|&&j| self.entries[j].family == ActionFamily::Permanent)
            {
                return Err(CalcError::invalid_input(
                    format!("{}.incompatibles", entry.code()),
                    self.entries[j].code(),
                    "Permanent actions are always present and cannot be mutually incompatible",
                ));
            }
        }

        Ok(ResolvedRelations {
            incompatible,
            mains,
            declared,
            empty_patterns,
        })
    }

    /// Relation findings that do not prevent generation.
    pub fn lint(&self, resolved: &ResolvedRelations) -> Vec<LintWarning> {
        let mut warnings = Vec::new();

        for (i, j) in resolved.one_way_pairs() {
            warnings.push(LintWarning::OneWayIncompatibility {
                action: self.entries[i].code().to_string(),
                other: self.entries[j].code().to_string(),
            });
        }

        for (i, pattern) in &resolved.empty_patterns {
            warnings.push(LintWarning::PatternMatchesNothing {
                action: self.entries[*i].code().to_string(),
                pattern: pattern.clone(),
            });
        }

        for (i, mains) in resolved.mains.iter().enumerate() {
            if !mains.is_empty() && mains.iter().all(|&m| !resolved.compatible(i, m)) {
                warnings.push(LintWarning::UnreachableAction {
                    action: self.entries[i].code().to_string(),
                });
            }
        }

        warnings
    }
}

fn check_main(code: &str, main: &str) -> CalcResult<()> {
    if main == code {
        return Err(CalcError::invalid_input(
            format!("{}.mains", code),
            main,
            "An action cannot be its own main action",
        ));
    }
    if main.trim().is_empty() {
        return Err(CalcError::invalid_input(format!("{}.mains", code), main, "Empty main action code"));
    }
    Ok(())
}

/// Relation graph over registration indices, frozen for one generation run.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRelations {
    /// Symmetric incompatibility sets
    incompatible: Vec<BTreeSet<usize>>,
    /// Main actions per action, sorted
    mains: Vec<Vec<usize>>,
    /// Directed pairs as declared (before mirroring)
    declared: BTreeSet<(usize, usize)>,
    empty_patterns: Vec<(usize, String)>,
}

impl ResolvedRelations {
    /// Two actions may appear in the same combination
    pub fn compatible(&self, a: usize, b: usize) -> bool {
        a == b || !self.incompatible[a].contains(&b)
    }

    /// `a` is compatible with every action of `others`
    pub fn compatible_with_all(&self, a: usize, others: &[usize]) -> bool {
        others.iter().all(|&b| self.compatible(a, b))
    }

    pub fn incompatibles(&self, a: usize) -> &BTreeSet<usize> {
        &self.incompatible[a]
    }

    pub fn mains(&self, a: usize) -> &[usize] {
        &self.mains[a]
    }

    /// No mains, or at least one of them is present
    pub fn mains_satisfied(&self, a: usize, present: impl Fn(usize) -> bool) -> bool {
        let mains = &self.mains[a];
        mains.is_empty() || mains.iter().any(|&m| present(m))
    }

    /// Pairs (declarer, other) declared in one direction only
    pub fn one_way_pairs(&self) -> Vec<(usize, usize)> {
        self.declared
            .iter()
            .filter(|(i, j)| !self.declared.contains(&(*j, *i)))
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, family: ActionFamily) -> ActionEntry {
        ActionEntry {
            action: Action::new(code, code),
            family,
            partial_safety_factors: "any".to_string(),
            combination_factors: None,
        }
    }

    fn traffic_registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.insert(entry("G", ActionFamily::Permanent)).unwrap();
        registry.insert(entry("LM6", ActionFamily::Variable)).unwrap();
        registry.insert(entry("LM7", ActionFamily::Variable)).unwrap();
        registry.insert(entry("W", ActionFamily::Variable)).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_action() {
        let mut registry = traffic_registry();
        let err = registry.insert(entry("LM6", ActionFamily::Variable)).unwrap_err();
        assert_eq!(err, CalcError::duplicate_action("LM6"));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_registration_order_kept() {
        let registry = traffic_registry();
        let codes: Vec<&str> = registry.entries().iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec!["G", "LM6", "LM7", "W"]);
        assert_eq!(registry.position("LM7"), Some(2));
        assert_eq!(registry.family_indices(ActionFamily::Variable), vec![1, 2, 3]);
    }

    #[test]
    fn test_incompatibility_is_mirrored() {
        let mut registry = traffic_registry();
        registry.append_incompatible("LM6", "LM7").unwrap();
        let resolved = registry.resolve().unwrap();
        assert!(!resolved.compatible(1, 2));
        assert!(!resolved.compatible(2, 1));
        assert!(resolved.compatible(1, 3));
        assert_eq!(resolved.one_way_pairs(), vec![(1, 2)]);
    }

    #[test]
    fn test_regex_resolved_against_later_actions() {
        let mut registry = ActionRegistry::new();
        registry.insert(entry("W", ActionFamily::Variable)).unwrap();
        registry.append_incompatible("W", "LM.*").unwrap();
        // registered after the rule that names them
        registry.insert(entry("LM6", ActionFamily::Variable)).unwrap();
        registry.insert(entry("LM7", ActionFamily::Variable)).unwrap();

        let resolved = registry.resolve().unwrap();
        assert!(!resolved.compatible(0, 1));
        assert!(!resolved.compatible(0, 2));
        assert!(resolved.compatible(1, 2));
    }

    #[test]
    fn test_self_incompatibility_is_ignored() {
        let mut registry = traffic_registry();
        registry.append_incompatible("LM6", "LM.*").unwrap();
        let resolved = registry.resolve().unwrap();
        assert!(resolved.compatible(1, 1));
        assert!(!resolved.compatible(1, 2));
    }

    #[test]
    fn test_unknown_literal_reference_fails_at_resolution() {
        let mut registry = traffic_registry();
        registry.append_incompatible("LM6", "LM9").unwrap();
        let err = registry.resolve().unwrap_err();
        assert_eq!(err, CalcError::unknown_action("LM6", "incompatible", "LM9"));
    }

    #[test]
    fn test_hyphenated_code_is_an_exact_reference() {
        let mut registry = traffic_registry();
        registry.insert(entry("Q-1", ActionFamily::Variable)).unwrap();
        registry.append_incompatible("Q-1", "Q-2").unwrap();
        let err = registry.resolve().unwrap_err();
        assert_eq!(err, CalcError::unknown_action("Q-1", "incompatible", "Q-2"));

        registry.insert(entry("Q-2", ActionFamily::Variable)).unwrap();
        let resolved = registry.resolve().unwrap();
        assert!(!resolved.compatible(4, 5));
    }

    #[test]
    fn test_unknown_main_fails_at_resolution() {
        let mut registry = traffic_registry();
        registry.append_main("W", "LM8").unwrap();
        let err = registry.resolve().unwrap_err();
        assert_eq!(err, CalcError::unknown_action("W", "main", "LM8"));
    }

    #[test]
    fn test_empty_regex_match_is_not_an_error() {
        let mut registry = traffic_registry();
        registry.append_incompatible("W", "SW.*").unwrap();
        let resolved = registry.resolve().unwrap();
        let warnings = registry.lint(&resolved);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, LintWarning::PatternMatchesNothing { pattern, .. } if pattern == "SW.*")));
    }

    #[test]
    fn test_relation_on_unknown_owner() {
        let mut registry = traffic_registry();

        let err = registry.append_incompatible("Q9", "W").unwrap_err();
        assert_eq!(err, CalcError::unknown_owner("Q9", "incompatible"));
        assert_eq!(err.error_code(), "UNKNOWN_ACTION");

        let err = registry.append_main("Q9", "W").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_ACTION");

        let err = registry.set_not_determinant("Q9", true).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_ACTION");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_main_cannot_be_self() {
        let mut registry = traffic_registry();
        assert!(registry.append_main("LM6", "LM6").is_err());
    }

    #[test]
    fn test_invalid_regex_rejected_at_declaration() {
        let mut registry = traffic_registry();
        let err = registry.append_incompatible("LM6", "LM[").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATTERN");
        assert!(registry.get("LM6").unwrap().action.relationships.incompatibles.is_empty());
    }

    #[test]
    fn test_permanent_actions_cannot_exclude_each_other() {
        let mut registry = traffic_registry();
        registry.insert(entry("G2", ActionFamily::Permanent)).unwrap();
        registry.append_incompatible("G", "G2").unwrap();
        assert!(registry.resolve().is_err());
    }

    #[test]
    fn test_mains_satisfied() {
        let mut registry = traffic_registry();
        registry.append_main("W", "LM6").unwrap();
        registry.append_main("W", "LM7").unwrap();
        let resolved = registry.resolve().unwrap();
        assert_eq!(resolved.mains(3), &[1, 2]);
        assert!(resolved.mains_satisfied(3, |i| i == 2));
        assert!(!resolved.mains_satisfied(3, |i| i == 0));
        assert!(resolved.mains_satisfied(1, |_| false));
    }

    #[test]
    fn test_unreachable_action_lint() {
        let mut registry = traffic_registry();
        registry.append_main("W", "LM6").unwrap();
        registry.append_incompatible("W", "LM6").unwrap();
        let resolved = registry.resolve().unwrap();
        let warnings = registry.lint(&resolved);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, LintWarning::UnreachableAction { action } if action == "W")));
    }
}
