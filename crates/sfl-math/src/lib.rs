//! Spectrum-based fault localization math.
//!
//! Two building blocks live here:
//! - [`NodeCounts`]: the four involvement counts (IF, NF, IS, NS) of a node
//! - [`Formula`]: the closed family of suspiciousness formulas over those counts

pub mod counts;
pub mod formula;

pub use counts::NodeCounts;
pub use formula::{Formula, UnknownFormula};
