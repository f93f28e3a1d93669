//! Regression over a SIA 260 railway bridge model: generated files are
//! compared byte for byte with `tests/fixtures/`.

use std::fs;
use std::path::PathBuf;

use combo_core::actions::ActionFamily;
use combo_core::codes::DesignCode;
use combo_core::combinations::{CombinationWriter, OutputFormat, Situation};
use combo_core::file_io::{combination_file_name, load_model, save_model, write_combination_files};
use combo_core::model::{ActionDeclaration, CombinationModel};

fn railway_bridge() -> CombinationModel {
    let mut model = CombinationModel::new("QA", "RB-01", "Single track railway bridge").with_code(DesignCode::Sia260);

    model.add_action(ActionDeclaration::new("G", "Self weight", ActionFamily::Permanent, "permanent"));
    model.add_action(ActionDeclaration::new("G2", "Ballast and track", ActionFamily::Permanent, "permanent"));
    model.add_action(
        ActionDeclaration::new("LM71", "Load model 71", ActionFamily::Variable, "railway_traffic")
            .with_combination_factors("railway_traffic"),
    );
    model.add_action(
        ActionDeclaration::new("LM71_BRK", "LM71 braking", ActionFamily::Variable, "railway_traffic")
            .with_combination_factors("railway_traffic")
            .with_main("LM71"),
    );
    model.add_action(
        ActionDeclaration::new("SW2", "Heavy load model SW/2", ActionFamily::Variable, "railway_traffic")
            .with_combination_factors("railway_traffic")
            .with_incompatible("LM71.*"),
    );
    model.add_action(
        ActionDeclaration::new("W", "Wind", ActionFamily::Variable, "variable").with_combination_factors("wind"),
    );
    model.add_action(
        ActionDeclaration::new("T", "Thermal", ActionFamily::Variable, "variable")
            .with_combination_factors("temperature"),
    );
    model.add_action(
        ActionDeclaration::new("DERAIL", "Derailment", ActionFamily::Accidental, "accidental").with_incompatible("SW2"),
    );
    model
}

fn fixture(situation: Situation) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(combination_file_name(situation, OutputFormat::Plain));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
}

#[test]
fn plain_files_match_fixtures() {
    let dir = tempfile::tempdir().unwrap();
    let sets = railway_bridge().generate().unwrap();

    let paths =
        write_combination_files(&sets, &CombinationWriter::default(), OutputFormat::Plain, 1, dir.path()).unwrap();

    for (set, path) in sets.iter().zip(&paths) {
        let written = fs::read_to_string(path).unwrap();
        if set.situation == Situation::UlsSeismic {
            assert_eq!(written, "", "no seismic action is registered");
            continue;
        }
        assert_eq!(written, fixture(set.situation), "{} differs from its fixture", set.situation);
    }
}

#[test]
fn saved_model_generates_the_same_files() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("railway_bridge.combo.json");
    save_model(&railway_bridge(), &model_path).unwrap();

    let loaded = load_model(&model_path).unwrap();
    let generator = loaded.build_generator().unwrap();
    let uls = generator.uls_persistent_combinations().unwrap();

    let mut plain = Vec::new();
    CombinationWriter::default().write_plain(&uls, &mut plain).unwrap();
    assert_eq!(String::from_utf8(plain).unwrap(), fixture(Situation::UlsPersistent));
}

#[test]
fn combination_names_and_counts() {
    let sets = railway_bridge().generate().unwrap();
    let counts: Vec<(Situation, usize)> = sets.iter().map(|s| (s.situation, s.len())).collect();
    assert_eq!(
        counts,
        vec![
            (Situation::UlsPersistent, 7),
            (Situation::UlsAccidental, 1),
            (Situation::UlsSeismic, 0),
            (Situation::SlsRare, 7),
            (Situation::SlsFrequent, 5),
            (Situation::SlsQuasiPermanent, 1),
        ]
    );

    let uls = &sets[0];
    let names: Vec<&str> = uls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ULS1", "ULS2", "ULS3", "ULS4", "ULS5", "ULS6", "ULS7"]);
    assert_eq!(uls.combinations[2].leading.as_deref(), Some("SW2"));

    let accidental = &sets[1];
    assert_eq!(accidental.combinations[0].leading.as_deref(), Some("DERAIL"));
}

#[test]
fn csv_numbering_continues_across_situations() {
    let dir = tempfile::tempdir().unwrap();
    let sets = railway_bridge().generate().unwrap();
    let paths =
        write_combination_files(&sets, &CombinationWriter::default(), OutputFormat::Csv, 100, dir.path()).unwrap();

    // 7 persistent rows (100..=106), then the accidental one
    let accidental = fs::read_to_string(&paths[1]).unwrap();
    assert_eq!(accidental, "idComb,descomp\n107,1.0*G+1.0*G2+0.5*T+1.0*DERAIL\n");
}
