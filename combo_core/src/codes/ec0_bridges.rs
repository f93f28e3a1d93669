//! EN 1990 Annex A2: bridges.
//!
//! Partial safety factors from Table A2.4(B); combination factors from
//! Tables A2.1 (road bridges), A2.2 (footbridges) and A2.3 (railway
//! bridges). Rows such as gr1b, SW/2 and construction loads do not satisfy
//! ψ2 ≤ ψ1 ≤ ψ0; they are entered as the code tables give them.

use crate::factors::{FactorTableSet, PartialSafetyFactors};

/// EN 1990 Annex A2 reference
pub const REFERENCE: &str = "EN 1990:2002+A1:2005, Annex A2";

/// Factor tables for road, foot and railway bridges.
pub fn ec0_bridges() -> FactorTableSet {
    FactorTableSet::new()
        .with_partial_safety_factors("permanent", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("prestress", PartialSafetyFactors::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("settlement", PartialSafetyFactors::new(0.0, 1.2, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("road_traffic", PartialSafetyFactors::new(0.0, 1.35, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("pedestrian_traffic", PartialSafetyFactors::new(0.0, 1.35, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("railway_traffic", PartialSafetyFactors::new(0.0, 1.45, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("variable", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("accidental", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("seismic", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        // Table A2.1, road bridges
        .with_combination_factors("road_bridge_gr1a_tandem", 0.75, 0.75, 0.0)
        .with_combination_factors("road_bridge_gr1a_udl", 0.4, 0.4, 0.0)
        .with_combination_factors("road_bridge_gr1a_pedestrian", 0.4, 0.4, 0.0)
        .with_combination_factors("road_bridge_gr1b", 0.0, 0.75, 0.0)
        .with_combination_factors("road_bridge_gr2", 0.0, 0.0, 0.0)
        .with_combination_factors("road_bridge_gr3", 0.0, 0.0, 0.0)
        .with_combination_factors("road_bridge_gr4", 0.0, 0.0, 0.0)
        .with_combination_factors("road_bridge_gr5", 0.0, 0.0, 0.0)
        .with_combination_factors("road_bridge_wind_persistent_situation", 0.6, 0.2, 0.0)
        .with_combination_factors("road_bridge_wind_execution", 0.8, 0.0, 0.0)
        .with_combination_factors("road_bridge_wind_fw_star", 1.0, 0.0, 0.0)
        .with_combination_factors("road_bridge_thermal", 0.6, 0.6, 0.5)
        .with_combination_factors("road_bridge_snow_execution", 0.8, 0.0, 0.0)
        .with_combination_factors("road_bridge_construction_loads", 1.0, 0.0, 1.0)
        // Table A2.2, footbridges
        .with_combination_factors("footbridge_gr1", 0.4, 0.4, 0.0)
        .with_combination_factors("footbridge_qfwk", 0.0, 0.0, 0.0)
        .with_combination_factors("footbridge_gr2", 0.0, 0.0, 0.0)
        .with_combination_factors("footbridge_wind", 0.3, 0.2, 0.0)
        .with_combination_factors("footbridge_thermal", 0.6, 0.6, 0.5)
        .with_combination_factors("footbridge_snow_execution", 0.8, 0.0, 0.0)
        .with_combination_factors("footbridge_construction_loads", 1.0, 0.0, 1.0)
        // Table A2.3, railway bridges
        .with_combination_factors("railway_lm71", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_sw0", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_sw2", 0.0, 1.0, 0.0)
        .with_combination_factors("railway_unloaded_train", 1.0, 0.0, 0.0)
        .with_combination_factors("railway_hse", 1.0, 1.0, 0.0)
        .with_combination_factors("railway_traction_braking", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_centrifugal", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_nosing", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_aerodynamic", 0.8, 0.5, 0.0)
        .with_combination_factors("railway_wind", 0.75, 0.5, 0.0)
        .with_combination_factors("railway_wind_fw_star", 1.0, 0.0, 0.0)
        .with_combination_factors("railway_thermal", 0.6, 0.6, 0.5)
        .with_combination_factors("railway_snow_execution", 0.8, 0.0, 0.0)
        .with_combination_factors("railway_construction_loads", 1.0, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::LintWarning;

    #[test]
    fn test_wind_and_thermal() {
        let tables = ec0_bridges();
        let wind = tables.combination_factors("road_bridge_wind_persistent_situation").unwrap();
        assert_eq!((wind.psi_0, wind.psi_1, wind.psi_2), (0.6, 0.2, 0.0));
        let thermal = tables.combination_factors("road_bridge_thermal").unwrap();
        assert_eq!((thermal.psi_0, thermal.psi_1, thermal.psi_2), (0.6, 0.6, 0.5));
    }

    #[test]
    fn test_code_rows_outside_psi_ordering_are_reported() {
        let keys: Vec<String> = ec0_bridges()
            .lint()
            .into_iter()
            .filter_map(|w| match w {
                LintWarning::PsiOrdering { key, .. } => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                "footbridge_construction_loads",
                "railway_construction_loads",
                "railway_sw2",
                "road_bridge_construction_loads",
                "road_bridge_gr1b",
            ]
        );
    }
}
