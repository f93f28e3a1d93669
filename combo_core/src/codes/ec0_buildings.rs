//! EN 1990 Annex A1: buildings.
//!
//! Partial safety factors from Table A1.2(B) (STR/GEO set B), combination
//! factors from Table A1.1.

use crate::factors::{FactorTableSet, PartialSafetyFactors};

/// EN 1990 Annex A1 reference
pub const REFERENCE: &str = "EN 1990:2002+A1:2005, Annex A1";

/// Factor tables for buildings.
///
/// ψ keys follow the imposed load categories of EN 1991-1-1
/// (`category_a_domestic` ... `category_h_roofs`) plus snow, wind and
/// temperature.
pub fn ec0_buildings() -> FactorTableSet {
    FactorTableSet::new()
        .with_partial_safety_factors("permanent", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("prestress", PartialSafetyFactors::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("variable", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("accidental", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("seismic", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_combination_factors("category_a_domestic", 0.7, 0.5, 0.3)
        .with_combination_factors("category_b_offices", 0.7, 0.5, 0.3)
        .with_combination_factors("category_c_congregation", 0.7, 0.7, 0.6)
        .with_combination_factors("category_d_shopping", 0.7, 0.7, 0.6)
        .with_combination_factors("category_e_storage", 1.0, 0.9, 0.8)
        .with_combination_factors("category_f_traffic_light", 0.7, 0.7, 0.6)
        .with_combination_factors("category_g_traffic_medium", 0.7, 0.5, 0.3)
        .with_combination_factors("category_h_roofs", 0.0, 0.0, 0.0)
        .with_combination_factors("snow_nordic", 0.7, 0.5, 0.2)
        .with_combination_factors("snow_above_1000m", 0.7, 0.5, 0.2)
        .with_combination_factors("snow_below_1000m", 0.5, 0.2, 0.0)
        .with_combination_factors("wind", 0.6, 0.2, 0.0)
        .with_combination_factors("temperature", 0.6, 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_psi() {
        let tables = ec0_buildings();
        let storage = tables.combination_factors("category_e_storage").unwrap();
        assert_eq!((storage.psi_0, storage.psi_1, storage.psi_2), (1.0, 0.9, 0.8));
    }

    #[test]
    fn test_all_rows_ordered() {
        assert!(ec0_buildings().lint().is_empty());
    }
}
