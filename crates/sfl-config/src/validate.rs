//! Configuration validation errors and semantic validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::localizer::LocalizerConfig;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Smallest explicit fusion pool that can leave two formulas selected.
pub const MIN_FUSION_POOL: usize = 3;

/// Validate a localizer configuration semantically.
pub fn validate_config(config: &LocalizerConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    // Selection keeps half the pool and fusion needs two rankings
    let pool = &config.fusion.formulas;
    if !pool.is_empty() && pool.len() < MIN_FUSION_POOL {
        return Err(ValidationError::InvalidValue {
            field: "fusion.formulas".to_string(),
            message: format!(
                "needs at least {} formulas, got {}",
                MIN_FUSION_POOL,
                pool.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    for formula in pool {
        if !seen.insert(formula) {
            return Err(ValidationError::SemanticError(format!(
                "fusion.formulas lists {} more than once",
                formula
            )));
        }
    }

    if let Some(levels) = &config.levels {
        if levels.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "levels".to_string(),
                message: "must name at least one formula when present".to_string(),
            });
        }
    }

    Ok(())
}
