//! Exit codes for the `sfl` CLI.
//!
//! Exit code ranges:
//! - 0-9: Success/operational outcomes
//! - 10-19: User/input errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

use crate::localizer::LocalizeError;
use sfl_config::ValidationError;
use sfl_spectra::SpectraError;

/// Exit codes for `sfl` operations.
///
/// These codes are a stable contract for scripts driving `sfl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Success / Operational Outcomes (0-9)
    // ========================================================================
    /// Command completed.
    Clean = 0,

    /// Ranking produced, but the requested node was not part of it.
    NodeNotRanked = 1,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments.
    ArgsError = 10,

    /// Configuration missing, unreadable or invalid.
    ConfigError = 11,

    /// Spectra or ranking input could not be parsed.
    InputError = 12,

    /// The localizer setup cannot rank this input (missing level
    /// localizer, too few fusion candidates).
    LocalizeError = 13,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report).
    InternalError = 20,

    /// I/O error.
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Codes 10-19: can be resolved by user action.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Codes 20-29: bugs or environment failures.
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Error code name (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NodeNotRanked => "OK_NOT_RANKED",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::LocalizeError => "ERR_LOCALIZE",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

impl From<&SpectraError> for ExitCode {
    fn from(err: &SpectraError) -> Self {
        match err {
            SpectraError::Io { .. } => ExitCode::IoError,
            SpectraError::Parse(_) => ExitCode::InputError,
            SpectraError::TraceOnHierarchicalLevel | SpectraError::TraceOutOfRange { .. } => {
                ExitCode::InternalError
            }
        }
    }
}

impl From<&ValidationError> for ExitCode {
    fn from(_: &ValidationError) -> Self {
        ExitCode::ConfigError
    }
}

impl From<&LocalizeError> for ExitCode {
    fn from(err: &LocalizeError) -> Self {
        match err {
            LocalizeError::MissingLevelLocalizer { .. }
            | LocalizeError::InsufficientSelection { .. } => ExitCode::LocalizeError,
            LocalizeError::Ranking(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::NodeNotRanked.is_error());
        assert!(ExitCode::ConfigError.is_user_error());
        assert!(ExitCode::IoError.is_internal_error());
        assert!(!ExitCode::LocalizeError.is_internal_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::InputError.to_string(), "ERR_INPUT (12)");
        assert_eq!(i32::from(ExitCode::IoError), 21);
    }

    #[test]
    fn test_error_mapping() {
        let err = LocalizeError::InsufficientSelection { selected: 1 };
        assert_eq!(ExitCode::from(&err), ExitCode::LocalizeError);
        let err = ValidationError::ParseError("x".to_string());
        assert_eq!(ExitCode::from(&err), ExitCode::ConfigError);
        assert_eq!(
            ExitCode::from(&SpectraError::TraceOnHierarchicalLevel),
            ExitCode::InternalError
        );
    }
}
