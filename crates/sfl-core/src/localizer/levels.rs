//! Hierarchical localization: one localizer per level, scores pushed down.

use std::collections::HashSet;

use sfl_math::Formula;
use sfl_spectra::{NodeId, SpectrumLevel};
use tracing::{debug, warn};

use super::{formula_localizers, FaultLocalizer, LocalizeError};
use crate::ranking::{Ranking, RankingView};

/// Ranks leaves by their own suspiciousness plus that of every ancestor.
///
/// Level 0 is the outermost level handed to [`LevelLocalizer::localize`];
/// each child level is one index deeper, ending at the leaf spectra.
pub struct LevelLocalizer<T: NodeId> {
    levels: Vec<Option<Box<dyn FaultLocalizer<T>>>>,
}

impl<T: NodeId> Default for LevelLocalizer<T> {
    fn default() -> Self {
        Self { levels: Vec::new() }
    }
}

impl<T: NodeId> LevelLocalizer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// One formula per level, outermost first.
    pub fn from_formulas(formulas: impl IntoIterator<Item = Formula>) -> Self {
        Self {
            levels: formula_localizers(formulas).into_iter().map(Some).collect(),
        }
    }

    /// Set the localizer for `level`, replacing any earlier one.
    pub fn set_level_localizer(&mut self, level: usize, localizer: Box<dyn FaultLocalizer<T>>) {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, || None);
        }
        self.levels[level] = Some(localizer);
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn name(&self) -> String {
        let names: Vec<String> = self
            .levels
            .iter()
            .map(|l| l.as_ref().map_or_else(|| "-".to_string(), |l| l.name()))
            .collect();
        format!("Level[{}]", names.join(","))
    }

    /// Rank the leaves below `spectra`.
    ///
    /// Leaves no root reaches are left out. A leaf reached through more than
    /// one path keeps the score of the last path walked.
    pub fn localize(
        &self,
        spectra: &dyn SpectrumLevel<Id = T>,
    ) -> Result<Ranking<T>, LocalizeError> {
        let mut level_rankings = Vec::new();
        let mut current = Some(spectra);
        while let Some(level) = current {
            let index = level_rankings.len();
            let localizer = self
                .levels
                .get(index)
                .and_then(Option::as_ref)
                .ok_or(LocalizeError::MissingLevelLocalizer { level: index })?;
            debug!(
                level = index,
                localizer = %localizer.name(),
                nodes = level.node_count(),
                "localizing level"
            );
            level_rankings.push(localizer.localize(level.as_spectrum())?);
            current = level.child_level();
        }

        let mut ranking = Ranking::new();
        let mut seen = HashSet::new();
        push_down(
            &mut ranking,
            &mut seen,
            spectra,
            &spectra.node_ids(),
            &level_rankings,
            0.0,
        )?;
        Ok(ranking)
    }
}

fn push_down<T: NodeId>(
    ranking: &mut Ranking<T>,
    seen: &mut HashSet<T>,
    level: &dyn SpectrumLevel<Id = T>,
    nodes: &[T],
    rankings: &[Ranking<T>],
    score: f64,
) -> Result<(), LocalizeError> {
    let Some((own, deeper)) = rankings.split_first() else {
        return Ok(());
    };

    match level.child_level() {
        Some(child) => {
            for node in nodes {
                let accumulated = score + own.suspiciousness(node)?;
                let children = level.children_of(node);
                push_down(ranking, seen, child, &children, deeper, accumulated)?;
            }
        }
        None => {
            for node in nodes {
                let total = score + own.suspiciousness(node)?;
                if !seen.insert(node.clone()) {
                    warn!(node = %node, "leaf reached through several paths; keeping the last score");
                }
                ranking.rank(node.clone(), total);
            }
        }
    }
    Ok(())
}

impl<T: NodeId> std::fmt::Debug for LevelLocalizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelLocalizer")
            .field("name", &self.name())
            .finish()
    }
}
