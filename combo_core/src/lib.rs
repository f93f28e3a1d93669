//! # combo_core - Load Combination Engine
//!
//! `combo_core` generates the load combinations required by limit state
//! design codes (EN 1990, IAPF-07, SIA 260). Actions are declared with their
//! family, factor table keys and relations; the generator expands them into
//! the ULS and SLS combinations of each design situation and renders them as
//! `1.35*G+1.5*Q+0.9*W` expressions.
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: the same catalog always yields the same combinations,
//!   names and strings (output is compared byte for byte against fixtures)
//! - **JSON-First**: models, tables, combinations and errors implement
//!   Serialize/Deserialize
//! - **Rich Errors**: configuration errors name the offending action, pattern
//!   or table key
//! - **Two phases**: relations are declared freely, then resolved against the
//!   final catalog right before generation
//!
//! ## Quick Start
//!
//! ```rust
//! use combo_core::actions::{Action, ActionFamily};
//! use combo_core::codes::sia260;
//! use combo_core::combinations::CombinationGenerator;
//!
//! let mut generator = CombinationGenerator::new("viaduct", sia260());
//! generator.insert(ActionFamily::Permanent, Action::new("G", "Self weight"), None, "permanent")?;
//! generator.insert(ActionFamily::Variable, Action::new("LM71", "Rail traffic"), Some("railway_traffic"), "railway_traffic")?;
//! generator.insert(
//!     ActionFamily::Variable,
//!     Action::new("SW2", "Heavy rail traffic").with_incompatible("LM71"),
//!     Some("railway_traffic"),
//!     "railway_traffic",
//! )?;
//!
//! let uls = generator.uls_persistent_combinations()?;
//! assert_eq!(uls.expressions(), vec!["1.35*G+1.45*LM71", "1.35*G+1.45*SW2"]);
//! # Ok::<(), combo_core::errors::CalcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`actions`] - Actions, families, relations and the registry
//! - [`factors`] - Partial safety factor and ψ tables
//! - [`codes`] - Built-in design code tables
//! - [`combinations`] - Generator, writer, solver container and envelopes
//! - [`lint`] - Consistency findings over tables and relations
//! - [`model`] - Model files (code, overrides, actions)
//! - [`file_io`] - Atomic saves and version-checked loads
//! - [`errors`] - Structured error types

pub mod actions;
pub mod codes;
pub mod combinations;
pub mod errors;
pub mod factors;
pub mod file_io;
pub mod lint;
pub mod model;

// Re-export commonly used types at crate root for convenience
pub use actions::{Action, ActionFamily};
pub use codes::DesignCode;
pub use combinations::{Combination, CombinationGenerator, CombinationSet, CombinationWriter, Situation};
pub use errors::{CalcError, CalcResult};
pub use factors::FactorTableSet;
pub use file_io::{load_model, save_model};
pub use model::{ActionDeclaration, CombinationModel};
