//! Spectrum-based fault localization core library.
//!
//! This library provides:
//! - Rankings with tie-aware best/worst positions and normalized views
//! - Fault localizers: per-formula, per-level and fused
//! - Evaluation metrics rows
//! - Logging, exit codes and output helpers for the `sfl` binary
//!
//! The spectra model lives in `sfl-spectra`, the formulas in `sfl-math` and
//! the configuration in `sfl-config`. The binary entry point is in `main.rs`.

pub mod exit_codes;
pub mod localizer;
pub mod logging;
pub mod metrics;
pub mod output;
pub mod ranking;

pub use localizer::{
    FaultLocalizer, FusingLocalizer, FusionOutcome, FusionTechnique, LevelLocalizer,
    LocalizeError, SelectionTechnique,
};
pub use ranking::{
    NormalizationStrategy, NormalizedRanking, Ranking, RankingError, RankingMetric, RankingView,
};
pub use sfl_math::{Formula, NodeCounts};
