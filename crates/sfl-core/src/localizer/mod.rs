//! Fault localizers: turn a spectrum into a suspiciousness ranking.
//!
//! Every [`Formula`] is a localizer on its own. [`LevelLocalizer`] walks a
//! hierarchy of spectra and [`FusingLocalizer`] combines several base
//! localizers into one ranking.

pub mod fusion;
pub mod levels;

pub use fusion::{FusingLocalizer, FusionOutcome};
pub use levels::LevelLocalizer;
pub use sfl_config::{FusionTechnique, SelectionTechnique};

use crate::ranking::{Ranking, RankingError, RankingView};
use sfl_math::Formula;
use sfl_spectra::{NodeId, Spectrum};
use thiserror::Error;
use tracing::debug;

/// Errors that abort one localization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("no fault localizer set for level {level} of the hierarchy")]
    MissingLevelLocalizer { level: usize },

    #[error("fusion kept {selected} localizer(s); at least 2 are needed")]
    InsufficientSelection { selected: usize },

    #[error(transparent)]
    Ranking(#[from] RankingError),
}

/// Something that ranks the nodes of a spectrum by suspiciousness.
pub trait FaultLocalizer<T: NodeId> {
    fn name(&self) -> String;

    fn localize(&self, spectra: &dyn Spectrum<Id = T>) -> Result<Ranking<T>, LocalizeError>;
}

impl<T: NodeId> FaultLocalizer<T> for Formula {
    fn name(&self) -> String {
        self.to_string()
    }

    fn localize(&self, spectra: &dyn Spectrum<Id = T>) -> Result<Ranking<T>, LocalizeError> {
        let mut ranking = Ranking::new();
        for id in spectra.node_ids() {
            let counts = spectra.counts(&id);
            ranking.rank(id, self.suspiciousness(&counts));
        }
        debug!(
            formula = %self,
            nodes = ranking.len(),
            traces = spectra.trace_count(),
            "ranked spectrum"
        );
        Ok(ranking)
    }
}

/// Boxed localizers for every formula in `formulas`, in order.
pub fn formula_localizers<T: NodeId>(
    formulas: impl IntoIterator<Item = Formula>,
) -> Vec<Box<dyn FaultLocalizer<T>>> {
    formulas
        .into_iter()
        .map(|f| Box::new(f) as Box<dyn FaultLocalizer<T>>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfl_spectra::Spectra;

    fn spectra() -> Spectra<&'static str> {
        let s = Spectra::new();
        s.add_trace(false).involve(["a", "b"]);
        s.add_trace(true).involve(["b", "c"]);
        s.add_trace(true).involve(["c"]);
        s
    }

    fn rank(formula: Formula, s: &Spectra<&'static str>) -> Ranking<&'static str> {
        FaultLocalizer::<&'static str>::localize(&formula, s).unwrap()
    }

    #[test]
    fn formula_ranks_every_node() {
        let s = spectra();
        let ranking = rank(Formula::Ochiai, &s);
        assert_eq!(ranking.len(), 3);
        // a: IF=1 NF=0 IS=0 -> 1.0
        assert_eq!(ranking.suspiciousness(&"a"), Ok(1.0));
        assert_eq!(ranking.wasted_effort(&"a"), Ok(0));
        assert_eq!(ranking.suspiciousness(&"c"), Ok(0.0));
    }

    #[test]
    fn formula_name_is_its_display_name() {
        let localizer: Box<dyn FaultLocalizer<&str>> = Box::new(Formula::Tarantula);
        assert_eq!(localizer.name(), "Tarantula");
    }

    #[test]
    fn unseen_nodes_are_not_ranked() {
        let s: Spectra<&str> = Spectra::new();
        let ranking = rank(Formula::Jaccard, &s);
        assert!(ranking.is_empty());
    }
}
