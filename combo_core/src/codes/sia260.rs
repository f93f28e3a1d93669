//! SIA 260/261: Swiss railway bridges.

use crate::factors::{FactorTableSet, PartialSafetyFactors};

pub const REFERENCE: &str = "SIA 260:2013, SIA 261:2014";

/// Factor tables for railway bridges per SIA 260 (tables 1 and 2) and
/// SIA 261 (rail traffic).
///
/// # Example
/// ```
/// use combo_core::codes::sia260;
/// use combo_core::factors::{Sense, SituationClass};
///
/// let tables = sia260();
/// let traffic = tables.partial_safety_factors("railway_traffic")?;
/// assert_eq!(traffic.factor(SituationClass::Persistent, Sense::Unfavorable), 1.45);
/// # Ok::<(), combo_core::errors::CalcError>(())
/// ```
pub fn sia260() -> FactorTableSet {
    FactorTableSet::new()
        .with_partial_safety_factors("permanent", PartialSafetyFactors::new(0.8, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("earth_pressure", PartialSafetyFactors::new(0.7, 1.35, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("prestress", PartialSafetyFactors::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0))
        .with_partial_safety_factors("railway_traffic", PartialSafetyFactors::new(0.0, 1.45, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("variable", PartialSafetyFactors::new(0.0, 1.5, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("accidental", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_partial_safety_factors("seismic", PartialSafetyFactors::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0))
        .with_combination_factors("railway_traffic", 0.8, 0.8, 0.0)
        .with_combination_factors("wind", 0.6, 0.5, 0.0)
        .with_combination_factors("temperature", 0.6, 0.6, 0.5)
        .with_combination_factors("snow", 0.6, 0.5, 0.0)
        .with_combination_factors("construction", 1.0, 1.0, 1.0)
}
