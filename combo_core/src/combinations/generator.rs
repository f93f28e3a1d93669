//! Combination generator.
//!
//! Expands an action catalog, its relations and a factor table set into the
//! load combinations of each design situation.
//!
//! ## Factors per situation
//!
//! | Situation          | γ set         | Leading      | Accompanying |
//! |--------------------|---------------|--------------|--------------|
//! | ULS persistent     | ULS           | 1            | ψ0           |
//! | ULS accidental     | ULS accidental| A at 1       | ψ2           |
//! | ULS seismic        | ULS accidental| AE at 1      | ψ2           |
//! | SLS rare           | SLS           | 1            | ψ0           |
//! | SLS frequent       | SLS           | ψ1           | ψ2           |
//! | SLS quasi-permanent| SLS           | (none)       | ψ2           |
//!
//! Permanent actions are in every combination. Each determinant variable
//! action leads in turn; the accompanying actions are the maximal compatible
//! sets computed by [`super::selection::accompanying_sets`]. Combinations that
//! end up with the same non-zero terms are emitted once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::selection::accompanying_sets;
use super::{Combination, CombinationSet, CombinationTerm, GeneratedCombinations, Situation};
use crate::actions::{Action, ActionEntry, ActionFamily, ActionRegistry, ResolvedRelations};
use crate::errors::{CalcError, CalcResult};
use crate::factors::{FactorTableSet, PsiFactor, Sense};
use crate::lint::LintWarning;

/// Which partial safety factor permanent actions take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermanentSense {
    /// Every permanent action unfavorable
    #[default]
    Unfavorable,
    /// Every permanent action favorable (uplift, overturning)
    Favorable,
    /// Every favorable/unfavorable assignment of the permanent actions
    Envelope,
}

/// How variable actions accompany an accidental action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccidentalVariableFactor {
    /// All variable actions at ψ2
    #[default]
    QuasiPermanent,
    /// One variable action at ψ1 (cycled), the others at ψ2
    FrequentLeading,
}

/// Generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratorOptions {
    #[serde(default)]
    pub permanent_sense: PermanentSense,
    #[serde(default)]
    pub accidental_variable_factor: AccidentalVariableFactor,
}

/// How an action enters a combination draft
#[derive(Debug, Clone, Copy, PartialEq)]
enum Role {
    Permanent(Sense),
    /// Accidental or seismic action, full design value
    Exceptional,
    /// Leading variable action, optionally reduced (SLS frequent)
    Leading(Option<PsiFactor>),
    Accompanying(PsiFactor),
}

/// Variable/exceptional part of a combination before permanents are added.
#[derive(Debug, Clone)]
struct Draft {
    leading: Option<usize>,
    members: Vec<(usize, Role)>,
}

/// Holds the actions and factor tables of one design code and generates its
/// load combinations.
///
/// Mutating methods take `&mut self` and generation takes `&self`, so the
/// catalog cannot change while combinations are being generated.
#[derive(Debug, Clone)]
pub struct CombinationGenerator {
    name: String,
    factors: FactorTableSet,
    registry: ActionRegistry,
    options: GeneratorOptions,
}

impl CombinationGenerator {
    /// Create a generator over a factor table set
    pub fn new(name: impl Into<String>, factors: FactorTableSet) -> Self {
        CombinationGenerator {
            name: name.into(),
            factors,
            registry: ActionRegistry::new(),
            options: GeneratorOptions::default(),
        }
    }

    /// Set generation options (builder pattern)
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GeneratorOptions) {
        self.options = options;
    }

    pub fn factors(&self) -> &FactorTableSet {
        &self.factors
    }

    /// Tables may be overridden (rows re-inserted) between registrations
    pub fn factors_mut(&mut self) -> &mut FactorTableSet {
        &mut self.factors
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Register an action.
    ///
    /// `combination_factors` is required for variable actions. Both keys must
    /// exist in the factor tables.
    ///
    /// # Example
    /// ```
    /// use combo_core::actions::{Action, ActionFamily};
    /// use combo_core::codes::ec0_buildings;
    /// use combo_core::combinations::CombinationGenerator;
    ///
    /// let mut generator = CombinationGenerator::new("office", ec0_buildings());
    /// generator.insert(ActionFamily::Permanent, Action::new("G", "Self weight"), None, "permanent")?;
    /// let err = generator
    ///     .insert(ActionFamily::Variable, Action::new("S", "Snow"), Some("snow_above_9000m"), "variable")
    ///     .unwrap_err();
    /// assert_eq!(err.error_code(), "UNKNOWN_COMBINATION_FACTORS");
    /// # Ok::<(), combo_core::errors::CalcError>(())
    /// ```
    pub fn insert(
        &mut self,
        family: ActionFamily,
        action: Action,
        combination_factors: Option<&str>,
        partial_safety_factors: &str,
    ) -> CalcResult<&Action> {
        if self.registry.contains(&action.code) {
            return Err(CalcError::duplicate_action(action.code));
        }
        self.factors.partial_safety_factors(partial_safety_factors)?;
        match combination_factors {
            Some(key) => {
                self.factors.combination_factors(key)?;
            }
            None if family == ActionFamily::Variable => {
                return Err(CalcError::missing_field(format!("{}.combination_factors", action.code)));
            }
            None => {}
        }

        let position = self.registry.insert(ActionEntry {
            action,
            family,
            partial_safety_factors: partial_safety_factors.to_string(),
            combination_factors: combination_factors.map(str::to_string),
        })?;
        Ok(&self.registry.entries()[position].action)
    }

    /// Declare `code` incompatible with the actions matching `pattern`
    pub fn append_incompatible(&mut self, code: &str, pattern: &str) -> CalcResult<()> {
        self.registry.append_incompatible(code, pattern)
    }

    /// Declare `main` as a main action of `code`
    pub fn append_main(&mut self, code: &str, main: &str) -> CalcResult<()> {
        self.registry.append_main(code, main)
    }

    /// Exclude (or re-admit) an action as leading action
    pub fn set_not_determinant(&mut self, code: &str, not_determinant: bool) -> CalcResult<()> {
        self.registry.set_not_determinant(code, not_determinant)
    }

    fn position(&self, code: &str) -> CalcResult<usize> {
        self.registry
            .position(code)
            .ok_or_else(|| CalcError::unknown_owner(code, "query"))
    }

    /// Whether two actions may appear in the same combination
    pub fn is_compatible(&self, a: &str, b: &str) -> CalcResult<bool> {
        let relations = self.registry.resolve()?;
        Ok(relations.compatible(self.position(a)?, self.position(b)?))
    }

    /// Resolved main actions of an action
    pub fn mains(&self, code: &str) -> CalcResult<Vec<String>> {
        let relations = self.registry.resolve()?;
        Ok(relations
            .mains(self.position(code)?)
            .iter()
            .map(|&m| self.registry.entries()[m].code().to_string())
            .collect())
    }

    /// Table and relation findings
    pub fn lint(&self) -> CalcResult<Vec<LintWarning>> {
        let relations = self.registry.resolve()?;
        let mut warnings = self.factors.lint();
        warnings.extend(self.registry.lint(&relations));
        Ok(warnings)
    }

    /// ULS persistent/transient combinations
    pub fn uls_persistent_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::UlsPersistent)
    }

    /// ULS accidental combinations
    pub fn uls_accidental_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::UlsAccidental)
    }

    /// ULS seismic combinations
    pub fn uls_seismic_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::UlsSeismic)
    }

    /// SLS rare (characteristic) combinations
    pub fn sls_rare_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::SlsRare)
    }

    /// SLS frequent combinations
    pub fn sls_frequent_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::SlsFrequent)
    }

    /// SLS quasi-permanent combinations
    pub fn sls_quasi_permanent_combinations(&self) -> CalcResult<CombinationSet> {
        self.generate(Situation::SlsQuasiPermanent)
    }

    /// Generate all six situations
    pub fn generate_all(&self) -> CalcResult<GeneratedCombinations> {
        Ok(GeneratedCombinations {
            uls_persistent: self.uls_persistent_combinations()?,
            uls_accidental: self.uls_accidental_combinations()?,
            uls_seismic: self.uls_seismic_combinations()?,
            sls_rare: self.sls_rare_combinations()?,
            sls_frequent: self.sls_frequent_combinations()?,
            sls_quasi_permanent: self.sls_quasi_permanent_combinations()?,
        })
    }

    /// Generate the combinations of one situation.
    ///
    /// Fails only on configuration errors found while resolving relations.
    /// An empty set is returned when the situation has nothing to combine.
    pub fn generate(&self, situation: Situation) -> CalcResult<CombinationSet> {
        let relations = self.registry.resolve()?;
        let entries = self.registry.entries();

        let permanents = self.registry.family_indices(ActionFamily::Permanent);
        let candidates: Vec<usize> = self
            .registry
            .family_indices(ActionFamily::Variable)
            .into_iter()
            .filter(|&v| relations.compatible_with_all(v, &permanents))
            .collect();

        let drafts = match situation {
            Situation::UlsPersistent | Situation::SlsRare | Situation::SlsFrequent => {
                self.leading_drafts(situation, &relations, &permanents, &candidates)
            }
            Situation::SlsQuasiPermanent => {
                if permanents.is_empty() {
                    Vec::new()
                } else {
                    // An empty pool still yields the permanent-only combination
                    accompanying_sets(&relations, &permanents, &candidates)
                        .into_iter()
                        .map(|set| Draft {
                            leading: None,
                            members: accompanying(&set, PsiFactor::QuasiPermanent),
                        })
                        .collect()
                }
            }
            Situation::UlsAccidental => {
                self.exceptional_drafts(situation, ActionFamily::Accidental, &relations, &permanents, &candidates)
            }
            Situation::UlsSeismic => {
                self.exceptional_drafts(situation, ActionFamily::Seismic, &relations, &permanents, &candidates)
            }
        };

        let variants = self.permanent_variants(situation, &permanents);

        let mut set = CombinationSet::new(situation);
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;

        for draft in &drafts {
            for variant in &variants {
                let mut members = variant.clone();
                members.extend(draft.members.iter().copied());
                members.sort_by_key(|(i, _)| *i);

                let terms: CalcResult<Vec<CombinationTerm>> = members
                    .iter()
                    .map(|&(i, role)| self.term(&entries[i], role, situation))
                    .collect();
                let terms = match terms {
                    Ok(terms) => terms,
                    Err(e) => {
                        log::error!("{}: skipping {} combination: {}", self.name, situation, e);
                        continue;
                    }
                };

                if terms.iter().all(CombinationTerm::is_null) {
                    continue;
                }
                if !seen.insert(identity_key(&terms)) {
                    duplicates += 1;
                    continue;
                }

                set.combinations.push(Combination {
                    name: format!("{}{}", situation.name_prefix(), set.len() + 1),
                    situation,
                    leading: draft.leading.map(|i| entries[i].code().to_string()),
                    terms,
                });
            }
        }

        log::debug!(
            "{}: {} {} combinations ({} duplicates removed)",
            self.name,
            set.len(),
            situation,
            duplicates
        );
        Ok(set)
    }

    /// Each determinant candidate leads in turn
    fn leading_drafts(
        &self,
        situation: Situation,
        relations: &ResolvedRelations,
        permanents: &[usize],
        candidates: &[usize],
    ) -> Vec<Draft> {
        let entries = self.registry.entries();
        let leaders: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| !entries[i].action.not_determinant)
            .collect();

        if leaders.is_empty() {
            // Permanent-only combination, ULS only
            return if situation == Situation::UlsPersistent {
                vec![Draft {
                    leading: None,
                    members: Vec::new(),
                }]
            } else {
                Vec::new()
            };
        }
        if !situation.is_uls() && permanents.is_empty() {
            return Vec::new();
        }

        let mut drafts = Vec::new();
        for &leading in &leaders {
            let mut base = permanents.to_vec();
            base.push(leading);
            for set in accompanying_sets(relations, &base, candidates) {
                if !relations.mains_satisfied(leading, |m| base.contains(&m) || set.contains(&m)) {
                    log::debug!(
                        "{}: {} cannot lead with accompanying set {:?}: no main action",
                        self.name,
                        entries[leading].code(),
                        codes(entries, &set)
                    );
                    continue;
                }
                let mut members = vec![(leading, Role::Leading(situation.leading_psi()))];
                members.extend(accompanying(&set, situation.accompanying_psi()));
                drafts.push(Draft {
                    leading: Some(leading),
                    members,
                });
            }
        }
        drafts
    }

    /// Each accidental (or seismic) action leads its own combinations
    fn exceptional_drafts(
        &self,
        situation: Situation,
        family: ActionFamily,
        relations: &ResolvedRelations,
        permanents: &[usize],
        candidates: &[usize],
    ) -> Vec<Draft> {
        let entries = self.registry.entries();
        let frequent_leading = situation == Situation::UlsAccidental
            && self.options.accidental_variable_factor == AccidentalVariableFactor::FrequentLeading;

        let mut drafts = Vec::new();
        for exceptional in self.registry.family_indices(family) {
            if !relations.compatible_with_all(exceptional, permanents) {
                log::warn!(
                    "{}: {} is incompatible with a permanent action and is never combined",
                    self.name,
                    entries[exceptional].code()
                );
                continue;
            }
            let mut base = permanents.to_vec();
            base.push(exceptional);

            let leaders: Vec<usize> = if frequent_leading {
                candidates
                    .iter()
                    .copied()
                    .filter(|&i| !entries[i].action.not_determinant && relations.compatible_with_all(i, &base))
                    .collect()
            } else {
                Vec::new()
            };

            if leaders.is_empty() {
                for set in accompanying_sets(relations, &base, candidates) {
                    if !relations.mains_satisfied(exceptional, |m| base.contains(&m) || set.contains(&m)) {
                        continue;
                    }
                    let mut members = vec![(exceptional, Role::Exceptional)];
                    members.extend(accompanying(&set, PsiFactor::QuasiPermanent));
                    drafts.push(Draft {
                        leading: Some(exceptional),
                        members,
                    });
                }
                continue;
            }

            for &leading in &leaders {
                let mut lead_base = base.clone();
                lead_base.push(leading);
                for set in accompanying_sets(relations, &lead_base, candidates) {
                    let present = |m: usize| lead_base.contains(&m) || set.contains(&m);
                    if !relations.mains_satisfied(exceptional, present) || !relations.mains_satisfied(leading, present) {
                        continue;
                    }
                    let mut members = vec![
                        (exceptional, Role::Exceptional),
                        (leading, Role::Leading(Some(PsiFactor::Frequent))),
                    ];
                    members.extend(accompanying(&set, PsiFactor::QuasiPermanent));
                    drafts.push(Draft {
                        leading: Some(exceptional),
                        members,
                    });
                }
            }
        }
        drafts
    }

    /// Favorable/unfavorable assignments of the permanent actions
    fn permanent_variants(&self, situation: Situation, permanents: &[usize]) -> Vec<Vec<(usize, Role)>> {
        let entries = self.registry.entries();
        let mut variants: Vec<Vec<(usize, Role)>> = vec![Vec::new()];

        for &p in permanents {
            let senses: Vec<Sense> = match self.options.permanent_sense {
                PermanentSense::Unfavorable => vec![Sense::Unfavorable],
                PermanentSense::Favorable => vec![Sense::Favorable],
                PermanentSense::Envelope => match self.factors.partial_safety_factors(&entries[p].partial_safety_factors) {
                    Ok(row)
                        if row.factor(situation.class(), Sense::Favorable)
                            != row.factor(situation.class(), Sense::Unfavorable) =>
                    {
                        vec![Sense::Unfavorable, Sense::Favorable]
                    }
                    _ => vec![Sense::Unfavorable],
                },
            };

            variants = variants
                .into_iter()
                .flat_map(|variant| {
                    senses.iter().map(move |&sense| {
                        let mut next = variant.clone();
                        next.push((p, Role::Permanent(sense)));
                        next
                    })
                })
                .collect();
        }
        variants
    }

    /// Coefficient of one action in one role
    fn term(&self, entry: &ActionEntry, role: Role, situation: Situation) -> CalcResult<CombinationTerm> {
        let gamma = self.factors.partial_safety_factors(&entry.partial_safety_factors)?;
        let class = situation.class();

        let coefficient = match role {
            Role::Permanent(sense) => gamma.factor(class, sense),
            Role::Exceptional | Role::Leading(None) => gamma.factor(class, Sense::Unfavorable),
            Role::Leading(Some(psi)) | Role::Accompanying(psi) => {
                let key = entry
                    .combination_factors
                    .as_deref()
                    .ok_or_else(|| CalcError::missing_factor(entry.code(), situation.display_name()))?;
                gamma.factor(class, Sense::Unfavorable) * self.factors.combination_factors(key)?.get(psi)
            }
        };

        Ok(CombinationTerm::new(entry.code(), coefficient))
    }
}

fn accompanying(set: &[usize], psi: PsiFactor) -> Vec<(usize, Role)> {
    set.iter().map(|&i| (i, Role::Accompanying(psi))).collect()
}

fn codes<'a>(entries: &'a [ActionEntry], indices: &[usize]) -> Vec<&'a str> {
    indices.iter().map(|&i| entries[i].code()).collect()
}

/// Order-free identity of a combination: non-zero terms sorted by code
fn identity_key(terms: &[CombinationTerm]) -> Vec<(String, i64)> {
    let mut key: Vec<(String, i64)> = terms
        .iter()
        .filter(|t| !t.is_null())
        .map(|t| (t.action.clone(), (t.coefficient * 1e6).round() as i64))
        .collect();
    key.sort();
    key
}
