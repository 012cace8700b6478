//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG path →
//! system path → built-in defaults.

use std::path::{Path, PathBuf};

use crate::localizer::LocalizerConfig;
use crate::validate::{validate_config, ValidationResult};

/// Discovered configuration file path.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path to sfl.json (or None if not found).
    pub config: Option<PathBuf>,

    /// Where the config was found (for diagnostics).
    pub source: ConfigSource,
}

/// Where a configuration file was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Found in /etc/sfl/.
    SystemConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::SystemConfig => write!(f, "system config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable names.
pub const ENV_CONFIG_PATH: &str = "SFL_CONFIG";
pub const ENV_CONFIG_DIR: &str = "SFL_CONFIG_DIR";

/// Standard config file name.
pub const CONFIG_FILENAME: &str = "sfl.json";

/// Application name for XDG directories.
const APP_NAME: &str = "sfl";

/// Resolve the configuration path using the standard resolution order.
///
/// 1. Explicit CLI path (if it exists)
/// 2. `SFL_CONFIG` environment variable
/// 3. `SFL_CONFIG_DIR` environment variable + `sfl.json`
/// 4. XDG config directory (`~/.config/sfl/`)
/// 5. System config (`/etc/sfl/`)
/// 6. Built-in defaults (None)
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    if let Some(path) = cli_path {
        if path.exists() {
            return found(path.to_path_buf(), ConfigSource::CliArgument);
        }
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::Environment);
        }
    }

    if let Some(dir) = xdg_config_dir() {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return found(path, ConfigSource::XdgConfig);
        }
    }

    let system_path = system_config_dir().join(CONFIG_FILENAME);
    if system_path.exists() {
        return found(system_path, ConfigSource::SystemConfig);
    }

    ConfigPaths::default()
}

fn found(path: PathBuf, source: ConfigSource) -> ConfigPaths {
    ConfigPaths {
        config: Some(path),
        source,
    }
}

/// Get the XDG config directory for sfl.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Get the system config directory.
pub fn system_config_dir() -> PathBuf {
    PathBuf::from("/etc").join(APP_NAME)
}

/// A resolved, parsed and validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: LocalizerConfig,
    pub paths: ConfigPaths,
    /// Raw file contents, kept for snapshot hashing.
    pub raw: Option<String>,
}

/// Resolve, read and validate the configuration.
///
/// A CLI path that does not exist is an error rather than a silent fallback.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<LoadedConfig> {
    if let Some(path) = cli_path {
        if !path.exists() {
            return Err(crate::ValidationError::IoError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
    }

    let paths = resolve_config(cli_path);
    let (config, raw) = match &paths.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|e| {
                crate::ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            (LocalizerConfig::from_json_str(&raw)?, Some(raw))
        }
        None => (LocalizerConfig::default(), None),
    };
    validate_config(&config)?;

    Ok(LoadedConfig { config, paths, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::CliArgument), "CLI argument");
        assert_eq!(
            format!("{}", ConfigSource::Environment),
            "environment variable"
        );
        assert_eq!(format!("{}", ConfigSource::XdgConfig), "XDG config");
        assert_eq!(format!("{}", ConfigSource::SystemConfig), "system config");
        assert_eq!(
            format!("{}", ConfigSource::BuiltinDefault),
            "builtin default"
        );
    }

    #[test]
    fn test_xdg_config_dir() {
        if let Some(path) = xdg_config_dir() {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn test_system_config_dir() {
        assert_eq!(system_config_dir(), PathBuf::from("/etc/sfl"));
    }

    #[test]
    fn test_missing_cli_path_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/sfl.json"))).unwrap_err();
        assert_eq!(err.code(), 60);
    }
}
