//! Program spectra for spectrum-based fault localization.
//!
//! This crate provides the data model the localizers run on:
//! - [`Spectra`]: the leaf level, owning traces and node involvement
//! - [`HierarchicalSpectra`]: coarser levels derived from a child level
//! - [`Spectrum`] / [`SpectrumLevel`]: object-safe read side shared by all levels
//! - Spectra providers and the JSON spectra dump

pub mod error;
pub mod hierarchy;
pub mod provider;
pub mod spectra;
pub mod spectrum;

pub use error::{Result, SpectraError};
pub use hierarchy::{HierarchicalSpectra, SpectrumLevel};
pub use provider::{
    HierarchicalSpectraProvider, JsonSpectraProvider, LoadedHierarchy, SpectraDump,
    SpectraProvider, TraceRecord,
};
pub use sfl_math::NodeCounts;
pub use spectra::{Spectra, Trace, TraceMut};
pub use spectrum::{scan_counts, Node, NodeId, Spectrum, SpectrumExt, TraceRef};
