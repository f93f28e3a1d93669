//! Structural properties every generated combination must satisfy, checked
//! over a railway bridge model under each permanent action treatment.

use combo_core::actions::ActionFamily;
use combo_core::codes::DesignCode;
use combo_core::combinations::{CombinationGenerator, CombinationSet, GeneratorOptions, PermanentSense, Situation};
use combo_core::factors::{PsiFactor, Sense};
use combo_core::model::{ActionDeclaration, CombinationModel};

fn bridge(permanent_sense: PermanentSense) -> CombinationModel {
    let mut model = CombinationModel::new("QA", "RB-02", "Two span railway bridge").with_code(DesignCode::Sia260);
    model.options = GeneratorOptions {
        permanent_sense,
        ..GeneratorOptions::default()
    };

    model.add_action(ActionDeclaration::new("G", "Self weight", ActionFamily::Permanent, "permanent"));
    model.add_action(ActionDeclaration::new("E", "Earth pressure", ActionFamily::Permanent, "earth_pressure"));
    for (code, extra_main) in [("LM71", None), ("LM71_BRK", Some("LM71")), ("LM71_CF", Some("LM71"))] {
        let mut declaration = ActionDeclaration::new(code, "Rail traffic", ActionFamily::Variable, "railway_traffic")
            .with_combination_factors("railway_traffic");
        if let Some(main) = extra_main {
            declaration = declaration.with_main(main);
        }
        model.add_action(declaration);
    }
    model.add_action(
        ActionDeclaration::new("SW2", "Heavy rail traffic", ActionFamily::Variable, "railway_traffic")
            .with_combination_factors("railway_traffic")
            .with_incompatible("LM71.*"),
    );
    model.add_action(
        ActionDeclaration::new("W", "Wind", ActionFamily::Variable, "variable").with_combination_factors("wind"),
    );
    model.add_action(
        ActionDeclaration::new("WT", "Wind on train", ActionFamily::Variable, "variable")
            .with_combination_factors("wind")
            .with_incompatible("W")
            .with_main("LM71")
            .with_main("SW2"),
    );
    model.add_action(
        ActionDeclaration::new("T", "Thermal", ActionFamily::Variable, "variable")
            .with_combination_factors("temperature")
            .not_determinant(),
    );
    model.add_action(ActionDeclaration::new("DERAIL", "Derailment", ActionFamily::Accidental, "accidental"));
    model.add_action(ActionDeclaration::new("EQ", "Earthquake", ActionFamily::Seismic, "seismic"));
    model
}

const SENSES: [PermanentSense; 3] = [PermanentSense::Unfavorable, PermanentSense::Favorable, PermanentSense::Envelope];

fn all_sets(generator: &CombinationGenerator) -> Vec<CombinationSet> {
    Situation::ALL.iter().map(|&s| generator.generate(s).unwrap()).collect()
}

#[test]
fn no_combination_holds_an_incompatible_pair() {
    for sense in SENSES {
        let generator = bridge(sense).build_generator().unwrap();
        for set in all_sets(&generator) {
            for combination in &set {
                let actions: Vec<&str> = combination.actions().collect();
                for (i, a) in actions.iter().enumerate() {
                    for b in &actions[i + 1..] {
                        assert!(
                            generator.is_compatible(a, b).unwrap(),
                            "{} holds incompatible {} and {}",
                            combination,
                            a,
                            b
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn main_actions_are_present() {
    let generator = bridge(PermanentSense::Envelope).build_generator().unwrap();
    for set in all_sets(&generator) {
        for combination in &set {
            for action in combination.actions() {
                let mains = generator.mains(action).unwrap();
                if mains.is_empty() {
                    continue;
                }
                assert!(
                    mains.iter().any(|m| combination.contains(m)),
                    "{}: {} present without any of {:?}",
                    combination,
                    action,
                    mains
                );
            }
        }
    }
}

#[test]
fn permanent_actions_are_always_present() {
    let generator = bridge(PermanentSense::Unfavorable).build_generator().unwrap();
    for set in all_sets(&generator) {
        assert!(!set.is_empty(), "{} is empty", set.situation);
        for combination in &set {
            assert!(combination.contains("G") && combination.contains("E"), "{}", combination);
        }
    }
}

#[test]
fn expressions_are_unique_and_names_sequential() {
    for sense in SENSES {
        let generator = bridge(sense).build_generator().unwrap();
        for set in all_sets(&generator) {
            let mut expressions = set.expressions();
            let count = expressions.len();
            expressions.sort();
            expressions.dedup();
            assert_eq!(expressions.len(), count, "duplicates in {}", set.situation);

            for (i, combination) in set.iter().enumerate() {
                assert_eq!(combination.name, format!("{}{}", set.situation.name_prefix(), i + 1));
            }
        }
    }
}

#[test]
fn generation_is_repeatable() {
    let model = bridge(PermanentSense::Envelope);
    let first = all_sets(&model.build_generator().unwrap());
    let generator = model.build_generator().unwrap();
    let second = all_sets(&generator);
    let third = all_sets(&generator);
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn coefficients_trace_back_to_the_tables() {
    let model = bridge(PermanentSense::Envelope);
    let tables = model.factor_tables();
    let generator = model.build_generator().unwrap();

    for set in all_sets(&generator) {
        let class = set.situation.class();
        for combination in &set {
            for term in &combination.terms {
                let declaration = model.action(&term.action).unwrap();
                let gamma = tables.partial_safety_factors(&declaration.partial_safety_factors).unwrap();
                let psi_values: Vec<f64> = match &declaration.combination_factors {
                    Some(key) => {
                        let psi = tables.combination_factors(key).unwrap();
                        vec![
                            1.0,
                            psi.get(PsiFactor::Combination),
                            psi.get(PsiFactor::Frequent),
                            psi.get(PsiFactor::QuasiPermanent),
                        ]
                    }
                    None => vec![1.0],
                };

                let traceable = [Sense::Favorable, Sense::Unfavorable].iter().any(|&sense| {
                    psi_values
                        .iter()
                        .any(|psi| (gamma.factor(class, sense) * psi - term.coefficient).abs() < 1e-12)
                });
                assert!(traceable, "{}: {} not traceable", combination, term.action);
            }
        }
    }
}

#[test]
fn envelope_covers_both_permanent_senses() {
    let unfavorable = bridge(PermanentSense::Unfavorable).generate().unwrap();
    let favorable = bridge(PermanentSense::Favorable).generate().unwrap();
    let envelope = bridge(PermanentSense::Envelope).generate().unwrap();

    for ((u, f), e) in unfavorable.iter().zip(&favorable).zip(&envelope) {
        let expressions = e.expressions();
        for expression in u.expressions().iter().chain(f.expressions().iter()) {
            assert!(expressions.contains(expression), "{} misses {}", e.situation, expression);
        }
    }
}

#[test]
fn not_determinant_action_never_leads() {
    let generator = bridge(PermanentSense::Unfavorable).build_generator().unwrap();
    for set in all_sets(&generator) {
        assert!(set.iter().all(|c| c.leading.as_deref() != Some("T")));
    }
}
