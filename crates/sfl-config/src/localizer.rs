//! Localizer configuration types.
//!
//! These types match the layout of `sfl.json`.

use serde::{Deserialize, Serialize};
use sfl_math::Formula;

use crate::validate::ValidationError;

/// Complete localizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizerConfig {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Formula used by single-formula ranking.
    #[serde(default = "default_formula")]
    pub formula: Formula,

    /// Normalization applied to single-formula rankings, if any.
    #[serde(default)]
    pub normalization: Option<NormalizationKind>,

    #[serde(default)]
    pub fusion: FusionConfig,

    /// One formula per hierarchy level, outermost level first.
    #[serde(default)]
    pub levels: Option<Vec<Formula>>,
}

/// Settings for the fusing localizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_fusion_normalization")]
    pub normalization: NormalizationKind,

    #[serde(default)]
    pub selection: SelectionTechnique,

    #[serde(default)]
    pub technique: FusionTechnique,

    /// Base formulas; empty means every formula.
    #[serde(default)]
    pub formulas: Vec<Formula>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationKind {
    ZeroOne,
    ReciprocalRank,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTechnique {
    #[default]
    OverlapRate,
    BiasRate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionTechnique {
    #[default]
    CombSum,
    CombAnz,
    CombMnz,
}

fn default_formula() -> Formula {
    Formula::Ochiai
}

fn default_fusion_normalization() -> NormalizationKind {
    NormalizationKind::ZeroOne
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            normalization: default_fusion_normalization(),
            selection: SelectionTechnique::default(),
            technique: FusionTechnique::default(),
            formulas: Vec::new(),
        }
    }
}

impl FusionConfig {
    /// The configured formula pool, with the empty list meaning all formulas.
    pub fn formula_pool(&self) -> Vec<Formula> {
        if self.formulas.is_empty() {
            Formula::ALL.to_vec()
        } else {
            self.formulas.clone()
        }
    }
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            formula: default_formula(),
            normalization: None,
            fusion: FusionConfig::default(),
            levels: None,
        }
    }
}

impl LocalizerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&content)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for NormalizationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizationKind::ZeroOne => write!(f, "zero_one"),
            NormalizationKind::ReciprocalRank => write!(f, "reciprocal_rank"),
        }
    }
}
