//! Error types for the spectra model and providers.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for spectra operations.
pub type Result<T> = std::result::Result<T, SpectraError>;

/// Errors raised by the spectra model and spectra providers.
#[derive(Error, Debug)]
pub enum SpectraError {
    /// Traces only exist at the leaf level of a hierarchy.
    #[error("cannot add a trace to a hierarchical spectra; traces only exist at the leaf level")]
    TraceOnHierarchicalLevel,

    #[error("trace index {index} out of range (spectra has {len} traces)")]
    TraceOutOfRange { index: usize, len: usize },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid spectra dump: {0}")]
    Parse(#[from] serde_json::Error),
}
