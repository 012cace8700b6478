//! Configuration snapshots for run provenance.
//!
//! A snapshot records which configuration a ranking was produced with, so
//! results can be traced back to the exact file later.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::localizer::LocalizerConfig;
use crate::resolve::ConfigPaths;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    /// SHA-256 of the raw config file, or of `"none"` for built-in defaults.
    pub config_hash: String,

    pub config_path: Option<String>,

    pub config_source: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub formula: String,
    pub normalization: Option<String>,
    pub fusion_pool_size: usize,
    pub fusion: String,
    pub level_count: usize,
}

impl ConfigSnapshot {
    /// Create a new snapshot from a loaded configuration.
    pub fn new(config: &LocalizerConfig, paths: &ConfigPaths, raw_json: Option<&str>) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            config_hash: hash_content(raw_json.unwrap_or("none")),
            config_path: paths.config.as_ref().map(|p| p.display().to_string()),
            config_source: paths.source.to_string(),
            summary: ConfigSummary::of(config),
        }
    }

    /// First 12 hex characters of the hash. Stamped on log events and
    /// command payloads as `config_id`.
    pub fn short_id(&self) -> &str {
        &self.config_hash[..12.min(self.config_hash.len())]
    }
}

impl ConfigSummary {
    fn of(config: &LocalizerConfig) -> Self {
        let fusion = &config.fusion;
        ConfigSummary {
            formula: config.formula.to_string(),
            normalization: config.normalization.map(|n| n.to_string()),
            fusion_pool_size: fusion.formula_pool().len(),
            fusion: format!(
                "{:?}/{:?}/{:?}",
                fusion.normalization, fusion.selection, fusion.technique
            )
            .to_lowercase(),
            level_count: config.levels.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Hash content with SHA-256 and return hex string.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
