//! The suspiciousness formula family.
//!
//! Every formula is a pure function of a node's [`NodeCounts`]. The family is
//! closed: [`Formula`] enumerates all members and doubles as the name lookup
//! table. Formulas never special-case degenerate inputs; NaN and infinities
//! are legitimate results and are handled by the ranking layer.

pub mod correlation;
pub mod heuristic;
pub mod similarity;

use crate::NodeCounts;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A formula name that is not part of the family.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown formula: {0}")]
pub struct UnknownFormula(pub String);

/// One member of the formula family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Formula {
    Ample,
    Anderberg,
    ArithmeticMean,
    Cohen,
    Dice,
    Euclid,
    Fleiss,
    GeometricMean,
    Goodman,
    Hamann,
    Hamming,
    HarmonicMean,
    Jaccard,
    Kulczynski1,
    Kulczynski2,
    M1,
    M2,
    Ochiai,
    Ochiai2,
    Overlap,
    RogersTanimoto,
    Rogot1,
    Rogot2,
    RussellRao,
    Scott,
    SimpleMatching,
    Sokal,
    SorensenDice,
    Tarantula,
    Wong1,
    Wong2,
    Wong3,
    Zoltar,
}

impl Formula {
    /// Every formula, in registration order.
    pub const ALL: [Formula; 33] = [
        Formula::Ample,
        Formula::Anderberg,
        Formula::ArithmeticMean,
        Formula::Cohen,
        Formula::Dice,
        Formula::Euclid,
        Formula::Fleiss,
        Formula::GeometricMean,
        Formula::Goodman,
        Formula::Hamann,
        Formula::Hamming,
        Formula::HarmonicMean,
        Formula::Jaccard,
        Formula::Kulczynski1,
        Formula::Kulczynski2,
        Formula::M1,
        Formula::M2,
        Formula::Ochiai,
        Formula::Ochiai2,
        Formula::Overlap,
        Formula::RogersTanimoto,
        Formula::Rogot1,
        Formula::Rogot2,
        Formula::RussellRao,
        Formula::Scott,
        Formula::SimpleMatching,
        Formula::Sokal,
        Formula::SorensenDice,
        Formula::Tarantula,
        Formula::Wong1,
        Formula::Wong2,
        Formula::Wong3,
        Formula::Zoltar,
    ];

    /// Display name of the formula.
    pub const fn name(self) -> &'static str {
        match self {
            Formula::Ample => "Ample",
            Formula::Anderberg => "Anderberg",
            Formula::ArithmeticMean => "ArithmeticMean",
            Formula::Cohen => "Cohen",
            Formula::Dice => "Dice",
            Formula::Euclid => "Euclid",
            Formula::Fleiss => "Fleiss",
            Formula::GeometricMean => "GeometricMean",
            Formula::Goodman => "Goodman",
            Formula::Hamann => "Hamann",
            Formula::Hamming => "Hamming",
            Formula::HarmonicMean => "HarmonicMean",
            Formula::Jaccard => "Jaccard",
            Formula::Kulczynski1 => "Kulczynski1",
            Formula::Kulczynski2 => "Kulczynski2",
            Formula::M1 => "M1",
            Formula::M2 => "M2",
            Formula::Ochiai => "Ochiai",
            Formula::Ochiai2 => "Ochiai2",
            Formula::Overlap => "Overlap",
            Formula::RogersTanimoto => "RogersTanimoto",
            Formula::Rogot1 => "Rogot1",
            Formula::Rogot2 => "Rogot2",
            Formula::RussellRao => "RussellRao",
            Formula::Scott => "Scott",
            Formula::SimpleMatching => "SimpleMatching",
            Formula::Sokal => "Sokal",
            Formula::SorensenDice => "SorensenDice",
            Formula::Tarantula => "Tarantula",
            Formula::Wong1 => "Wong1",
            Formula::Wong2 => "Wong2",
            Formula::Wong3 => "Wong3",
            Formula::Zoltar => "Zoltar",
        }
    }

    /// The function backing this formula.
    pub fn function(self) -> fn(&NodeCounts) -> f64 {
        match self {
            Formula::Ample => heuristic::ample,
            Formula::Anderberg => similarity::anderberg,
            Formula::ArithmeticMean => correlation::arithmetic_mean,
            Formula::Cohen => correlation::cohen,
            Formula::Dice => similarity::dice,
            Formula::Euclid => similarity::euclid,
            Formula::Fleiss => correlation::fleiss,
            Formula::GeometricMean => correlation::geometric_mean,
            Formula::Goodman => similarity::goodman,
            Formula::Hamann => similarity::hamann,
            Formula::Hamming => similarity::hamming,
            Formula::HarmonicMean => correlation::harmonic_mean,
            Formula::Jaccard => similarity::jaccard,
            Formula::Kulczynski1 => similarity::kulczynski1,
            Formula::Kulczynski2 => similarity::kulczynski2,
            Formula::M1 => similarity::m1,
            Formula::M2 => similarity::m2,
            Formula::Ochiai => similarity::ochiai,
            Formula::Ochiai2 => correlation::ochiai2,
            Formula::Overlap => similarity::overlap,
            Formula::RogersTanimoto => similarity::rogers_tanimoto,
            Formula::Rogot1 => similarity::rogot1,
            Formula::Rogot2 => similarity::rogot2,
            Formula::RussellRao => similarity::russell_rao,
            Formula::Scott => correlation::scott,
            Formula::SimpleMatching => similarity::simple_matching,
            Formula::Sokal => similarity::sokal,
            Formula::SorensenDice => similarity::sorensen_dice,
            Formula::Tarantula => heuristic::tarantula,
            Formula::Wong1 => heuristic::wong1,
            Formula::Wong2 => heuristic::wong2,
            Formula::Wong3 => heuristic::wong3,
            Formula::Zoltar => heuristic::zoltar,
        }
    }

    /// Suspiciousness of a node with the given counts.
    pub fn suspiciousness(self, counts: &NodeCounts) -> f64 {
        (self.function())(counts)
    }

    /// Look a formula up by name, ignoring case and `-`/`_` separators.
    pub fn lookup(name: &str) -> Option<Formula> {
        let wanted = normalize_name(name);
        Formula::ALL
            .iter()
            .copied()
            .find(|f| normalize_name(f.name()) == wanted)
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Formula {
    type Err = UnknownFormula;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::lookup(s).ok_or_else(|| UnknownFormula(s.to_string()))
    }
}

impl TryFrom<String> for Formula {
    type Error = UnknownFormula;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.name().to_string()
    }
}
