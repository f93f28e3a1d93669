//! # Model Files
//!
//! A [`CombinationModel`] is the declarative input of a generation run: the
//! design code, factor overrides, generator options and the action catalog.
//! Models serialize to `.combo.json` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! CombinationModel
//! ├── meta: ModelMetadata (version, engineer, job info, timestamps)
//! ├── code: Option<DesignCode> (built-in tables)
//! ├── factors: FactorTableSet (rows overriding or extending the code)
//! ├── options: GeneratorOptions
//! ├── actions: Vec<ActionDeclaration> (registration order)
//! └── situations: Vec<Situation> (defaults to all six)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use combo_core::actions::ActionFamily;
//! use combo_core::codes::DesignCode;
//! use combo_core::model::{ActionDeclaration, CombinationModel};
//!
//! let mut model = CombinationModel::new("Jane Engineer", "25-042", "Viaduct").with_code(DesignCode::Sia260);
//! model.add_action(ActionDeclaration::new("G", "Self weight", ActionFamily::Permanent, "permanent"));
//! model.add_action(
//!     ActionDeclaration::new("W", "Wind", ActionFamily::Variable, "variable").with_combination_factors("wind"),
//! );
//!
//! let generator = model.build_generator()?;
//! let uls = generator.uls_persistent_combinations()?;
//! assert_eq!(uls.expressions(), vec!["1.35*G+1.5*W"]);
//! # Ok::<(), combo_core::errors::CalcError>(())
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionFamily, ActionRelationships};
use crate::codes::DesignCode;
use crate::combinations::{CombinationGenerator, CombinationSet, GeneratorOptions, Situation};
use crate::errors::CalcResult;
use crate::factors::FactorTableSet;

/// Current schema version for model files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// File extension of model files
pub const MODEL_EXTENSION: &str = "combo.json";

/// Root model container, serialized to `.combo.json` files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationModel {
    pub meta: ModelMetadata,

    /// Built-in code whose tables are loaded first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<DesignCode>,

    /// Rows added over the code tables (same key replaces the code row)
    #[serde(default)]
    pub factors: FactorTableSet,

    #[serde(default)]
    pub options: GeneratorOptions,

    /// Actions in registration order
    #[serde(default)]
    pub actions: Vec<ActionDeclaration>,

    /// Situations to generate
    #[serde(default = "all_situations")]
    pub situations: Vec<Situation>,
}

fn all_situations() -> Vec<Situation> {
    Situation::ALL.to_vec()
}

impl CombinationModel {
    /// Create an empty model with no code and all situations selected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use combo_core::model::{CombinationModel, SCHEMA_VERSION};
    ///
    /// let model = CombinationModel::new("John Doe", "25-001", "Footbridge");
    /// assert_eq!(model.meta.version, SCHEMA_VERSION);
    /// assert_eq!(model.situations.len(), 6);
    /// ```
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        CombinationModel {
            meta: ModelMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                description: description.into(),
                created: now,
                modified: now,
            },
            code: None,
            factors: FactorTableSet::default(),
            options: GeneratorOptions::default(),
            actions: Vec::new(),
            situations: all_situations(),
        }
    }

    /// Select a built-in code (builder pattern)
    pub fn with_code(mut self, code: DesignCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Starter model for `combo init`: self weight, one traffic or imposed
    /// load and wind, keyed to the code's tables.
    pub fn starter(code: DesignCode) -> Self {
        let (traffic_psf, traffic_psi, wind_psi) = match code {
            DesignCode::Ec0Buildings => ("variable", "category_b_offices", "wind"),
            DesignCode::Ec0Bridges => (
                "road_traffic",
                "road_bridge_gr1a_tandem",
                "road_bridge_wind_persistent_situation",
            ),
            DesignCode::Iapf => ("railway_traffic", "railway_traffic", "wind"),
            DesignCode::Sia260 => ("railway_traffic", "railway_traffic", "wind"),
        };

        let mut model = CombinationModel::new("", "", code.description()).with_code(code);
        model.add_action(ActionDeclaration::new("G", "Self weight", ActionFamily::Permanent, "permanent"));
        model.add_action(
            ActionDeclaration::new("Q", "Traffic or imposed load", ActionFamily::Variable, traffic_psf)
                .with_combination_factors(traffic_psi),
        );
        model.add_action(
            ActionDeclaration::new("W", "Wind", ActionFamily::Variable, "variable").with_combination_factors(wind_psi),
        );
        model
    }

    /// Append an action declaration
    pub fn add_action(&mut self, action: ActionDeclaration) {
        self.actions.push(action);
        self.touch();
    }

    pub fn action(&self, code: &str) -> Option<&ActionDeclaration> {
        self.actions.iter().find(|a| a.code == code)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Code tables with the model's rows laid over them
    pub fn factor_tables(&self) -> FactorTableSet {
        let mut tables = self.code.map(|c| c.factor_tables()).unwrap_or_default();
        tables.merge(&self.factors);
        tables
    }

    /// Register every declared action in a new generator.
    ///
    /// Stops at the first configuration error, naming the offending action
    /// or key.
    pub fn build_generator(&self) -> CalcResult<CombinationGenerator> {
        let name = if self.meta.job_id.is_empty() {
            self.meta.description.clone()
        } else {
            self.meta.job_id.clone()
        };
        let mut generator = CombinationGenerator::new(name, self.factor_tables()).with_options(self.options);

        for declaration in &self.actions {
            generator.insert(
                declaration.family,
                declaration.to_action(),
                declaration.combination_factors.as_deref(),
                &declaration.partial_safety_factors,
            )?;
        }

        log::debug!(
            "model '{}': {} actions registered",
            generator.name(),
            generator.registry().len()
        );
        Ok(generator)
    }

    /// Generate the selected situations, in model order
    pub fn generate(&self) -> CalcResult<Vec<CombinationSet>> {
        let generator = self.build_generator()?;
        self.situations.iter().map(|&s| generator.generate(s)).collect()
    }
}

impl Default for CombinationModel {
    fn default() -> Self {
        CombinationModel::new("", "", "")
    }
}

/// Model metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    #[serde(default)]
    pub engineer: String,

    /// Job/project number
    #[serde(default)]
    pub job_id: String,

    /// Structure the model belongs to
    #[serde(default)]
    pub description: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// One action as written in a model file.
///
/// ```json
/// {
///   "code": "LM71_BRK",
///   "description": "Braking of LM71",
///   "family": "variable",
///   "partial_safety_factors": "railway_traffic",
///   "combination_factors": "railway_traffic",
///   "mains": ["LM71"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDeclaration {
    pub code: String,

    #[serde(default)]
    pub description: String,

    pub family: ActionFamily,

    /// Partial safety factor key
    pub partial_safety_factors: String,

    /// ψ key, required for variable actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combination_factors: Option<String>,

    /// Incompatibility patterns (exact codes or regex)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incompatible: Vec<String>,

    /// Main actions, any one of which must be present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mains: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_determinant: bool,
}

impl ActionDeclaration {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        family: ActionFamily,
        partial_safety_factors: impl Into<String>,
    ) -> Self {
        ActionDeclaration {
            code: code.into(),
            description: description.into(),
            family,
            partial_safety_factors: partial_safety_factors.into(),
            combination_factors: None,
            incompatible: Vec::new(),
            mains: Vec::new(),
            not_determinant: false,
        }
    }

    /// Set the ψ key (builder pattern)
    pub fn with_combination_factors(mut self, key: impl Into<String>) -> Self {
        self.combination_factors = Some(key.into());
        self
    }

    /// Add an incompatibility pattern (builder pattern)
    pub fn with_incompatible(mut self, pattern: impl Into<String>) -> Self {
        self.incompatible.push(pattern.into());
        self
    }

    /// Add a main action (builder pattern)
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.mains.push(main.into());
        self
    }

    /// Never leading (builder pattern)
    pub fn not_determinant(mut self) -> Self {
        self.not_determinant = true;
        self
    }

    /// The [`Action`] this declaration registers
    pub fn to_action(&self) -> Action {
        Action {
            code: self.code.clone(),
            description: self.description.clone(),
            relationships: ActionRelationships {
                incompatibles: self.incompatible.clone(),
                mains: self.mains.clone(),
            },
            not_determinant: self.not_determinant,
        }
    }
}
