//! # Design Code Tables
//!
//! Built-in partial safety factor and combination factor tables. Each code
//! is a pure builder function returning a fresh [`FactorTableSet`]; model
//! files name one through [`DesignCode`] and may override single rows.
//!
//! | Code            | Scope                                  | Builder            |
//! |-----------------|----------------------------------------|--------------------|
//! | EN 1990 A1      | Buildings                              | [`ec0_buildings`]  |
//! | EN 1990 A2      | Road, foot and railway bridges         | [`ec0_bridges`]    |
//! | IAPF-07         | Spanish railway bridges                | [`iapf`]           |
//! | SIA 260/261     | Swiss railway bridges                  | [`sia260`]         |
//!
//! ## Example
//!
//! ```rust
//! use combo_core::codes::DesignCode;
//!
//! let tables = DesignCode::Ec0Bridges.factor_tables();
//! let wind = tables.combination_factors("road_bridge_wind_persistent_situation")?;
//! assert_eq!(wind.psi_1, 0.2);
//! # Ok::<(), combo_core::errors::CalcError>(())
//! ```

mod ec0_bridges;
mod ec0_buildings;
mod iapf;
mod sia260;

pub use ec0_bridges::ec0_bridges;
pub use ec0_buildings::ec0_buildings;
pub use iapf::iapf;
pub use sia260::sia260;

use serde::{Deserialize, Serialize};

use crate::factors::FactorTableSet;

/// Built-in design codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignCode {
    Ec0Buildings,
    Ec0Bridges,
    Iapf,
    Sia260,
}

impl DesignCode {
    pub const ALL: [DesignCode; 4] = [
        DesignCode::Ec0Buildings,
        DesignCode::Ec0Bridges,
        DesignCode::Iapf,
        DesignCode::Sia260,
    ];

    /// Short identifier, as written in model files and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            DesignCode::Ec0Buildings => "ec0_buildings",
            DesignCode::Ec0Bridges => "ec0_bridges",
            DesignCode::Iapf => "iapf",
            DesignCode::Sia260 => "sia260",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DesignCode::Ec0Buildings => "EN 1990 Annex A1 - buildings",
            DesignCode::Ec0Bridges => "EN 1990 Annex A2 - road, foot and railway bridges",
            DesignCode::Iapf => "IAPF-07 - actions on Spanish railway bridges",
            DesignCode::Sia260 => "SIA 260/261 - Swiss railway bridges",
        }
    }

    /// Standard the tables are taken from
    pub fn reference(&self) -> &'static str {
        match self {
            DesignCode::Ec0Buildings => ec0_buildings::REFERENCE,
            DesignCode::Ec0Bridges => ec0_bridges::REFERENCE,
            DesignCode::Iapf => iapf::REFERENCE,
            DesignCode::Sia260 => sia260::REFERENCE,
        }
    }

    /// Parse an identifier produced by [`DesignCode::code`]
    pub fn from_code(code: &str) -> Option<DesignCode> {
        DesignCode::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// Fresh copy of the code's tables
    pub fn factor_tables(&self) -> FactorTableSet {
        match self {
            DesignCode::Ec0Buildings => ec0_buildings(),
            DesignCode::Ec0Bridges => ec0_bridges(),
            DesignCode::Iapf => iapf(),
            DesignCode::Sia260 => sia260(),
        }
    }
}

impl std::fmt::Display for DesignCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
