//! Localizer configuration loading and validation.
//!
//! This crate provides:
//! - Typed structs for `sfl.json`
//! - Config resolution (CLI → env → XDG → system → defaults)
//! - Semantic validation with stable error codes
//! - Config snapshots for run provenance

pub mod localizer;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use localizer::{
    FusionConfig, FusionTechnique, LocalizerConfig, NormalizationKind, SelectionTechnique,
};
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource, LoadedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult, MIN_FUSION_POOL};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
