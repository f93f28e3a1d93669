//! IAPF-07: actions on Spanish railway bridges.

use crate::factors::{FactorTableSet, PartialSafetyFactors};

pub const REFERENCE: &str = "IAPF-07, Instrucción de acciones a considerar en puentes de ferrocarril";

/// Factor tables for railway bridges per IAPF-07 (tables 6.1 and 6.2).
///
/// Non-constant permanent actions (earth pressure, ballast variations) take
/// γ = 1.5 unfavorable; rheological actions follow the permanent row.
pub fn iapf() -> FactorTableSet {
    FactorTableSet::new()
        .with_partial_safety_factors("permanent", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors(
            "permanent_non_constant",
            PartialSafetyFactors::new(1.0, 1.5, 1.0, 1.0, 1.0, 1.0),
        )
        .with_partial_safety_factors("prestress", PartialSafetyFactors::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("rheological", PartialSafetyFactors::new(1.0, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("railway_traffic", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("variable", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("accidental", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("seismic", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_combination_factors("railway_traffic", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_traffic_single_track", 0.8, 0.8, 0.0)
        .with_combination_factors("railway_traffic_two_tracks", 0.8, 0.6, 0.0)
        .with_combination_factors("railway_traffic_three_tracks", 0.8, 0.4, 0.0)
        .with_combination_factors("railway_aerodynamic", 0.8, 0.5, 0.0)
        .with_combination_factors("pedestrian", 0.4, 0.4, 0.0)
        .with_combination_factors("wind", 0.6, 0.5, 0.0)
        .with_combination_factors("thermal", 0.6, 0.6, 0.5)
        .with_combination_factors("snow", 0.6, 0.2, 0.0)
        .with_combination_factors("hydraulic", 1.0, 1.0, 1.0)
}
