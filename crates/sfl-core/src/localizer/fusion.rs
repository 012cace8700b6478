//! Fusing localizer: select diverse base rankings and combine their scores.
//!
//! Each base localizer's ranking is normalized, its top K nodes collected,
//! and half of the localizers kept by overlap or bias rate. The kept
//! normalized scores are combined per node with CombSUM, CombANZ or CombMNZ.

use std::collections::{HashMap, HashSet};

use sfl_config::{FusionConfig, FusionTechnique, SelectionTechnique};
use sfl_math::Formula;
use sfl_spectra::{NodeId, Spectrum};
use tracing::{debug, info};

use super::{formula_localizers, FaultLocalizer, LocalizeError};
use crate::logging::event_names;
use crate::ranking::{NormalizationStrategy, NormalizedRanking, Ranking, RankingView};

/// Smallest number of top-ranked nodes compared between localizers.
pub const MIN_TOP_K: usize = 10;

/// `max(10, ceil(0.1 * nodes))`.
pub fn top_k_size(node_count: usize) -> usize {
    node_count.div_ceil(10).max(MIN_TOP_K)
}

fn selection_name(selection: SelectionTechnique) -> &'static str {
    match selection {
        SelectionTechnique::OverlapRate => "OverlapRate",
        SelectionTechnique::BiasRate => "BiasRate",
    }
}

fn technique_name(technique: FusionTechnique) -> &'static str {
    match technique {
        FusionTechnique::CombSum => "CombSum",
        FusionTechnique::CombAnz => "CombAnz",
        FusionTechnique::CombMnz => "CombMnz",
    }
}

/// Result of one fusion run.
#[derive(Debug, Clone)]
pub struct FusionOutcome<T: NodeId> {
    pub ranking: Ranking<T>,
    /// Names of the kept localizers, in selection order.
    pub selected: Vec<String>,
    /// Selection score of every base localizer, in pool order.
    pub scores: Vec<(String, f64)>,
}

/// Combines a pool of base localizers.
pub struct FusingLocalizer<T: NodeId> {
    localizers: Vec<Box<dyn FaultLocalizer<T>>>,
    normalization: NormalizationStrategy,
    selection: SelectionTechnique,
    technique: FusionTechnique,
}

impl<T: NodeId> FusingLocalizer<T> {
    /// Fuse over every known formula.
    pub fn new(
        normalization: NormalizationStrategy,
        selection: SelectionTechnique,
        technique: FusionTechnique,
    ) -> Self {
        Self::with_localizers(
            normalization,
            selection,
            technique,
            formula_localizers(Formula::ALL),
        )
    }

    pub fn with_localizers(
        normalization: NormalizationStrategy,
        selection: SelectionTechnique,
        technique: FusionTechnique,
        localizers: Vec<Box<dyn FaultLocalizer<T>>>,
    ) -> Self {
        Self {
            localizers,
            normalization,
            selection,
            technique,
        }
    }

    pub fn from_config(config: &FusionConfig) -> Self {
        Self::with_localizers(
            config.normalization.into(),
            config.selection,
            config.technique,
            formula_localizers(config.formula_pool()),
        )
    }

    pub fn localizer_names(&self) -> Vec<String> {
        self.localizers.iter().map(|l| l.name()).collect()
    }

    /// Rank, select and combine, keeping the selection for reporting.
    pub fn fuse(&self, spectra: &dyn Spectrum<Id = T>) -> Result<FusionOutcome<T>, LocalizeError> {
        let rankings = self
            .localizers
            .iter()
            .map(|l| {
                l.localize(spectra)
                    .map(|r| NormalizedRanking::from_ranking(r, self.normalization))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let k = top_k_size(spectra.node_count());
        let top: Vec<HashSet<T>> = rankings
            .iter()
            .map(|r| r.raw().nodes().take(k).cloned().collect())
            .collect();

        let scores = match self.selection {
            SelectionTechnique::OverlapRate => overlap_rates(&top),
            SelectionTechnique::BiasRate => bias_rates(&top),
        };
        let selected = select(&scores, self.selection);
        let names = self.localizer_names();

        info!(
            target: event_names::FUSION_SELECTED,
            localizer = %self.name(),
            top_k = k,
            pool = rankings.len(),
            selected = selected.len(),
            "selected base localizers"
        );
        if selected.len() < 2 {
            return Err(LocalizeError::InsufficientSelection {
                selected: selected.len(),
            });
        }

        let mut ranking = Ranking::new();
        for id in spectra.node_ids() {
            let mut contributions = Vec::with_capacity(selected.len());
            for &i in &selected {
                contributions.push(rankings[i].suspiciousness(&id)?);
            }
            ranking.rank(id, combine(self.technique, &contributions));
        }
        debug!(nodes = ranking.len(), "fused ranking");

        Ok(FusionOutcome {
            ranking,
            selected: selected.iter().map(|&i| names[i].clone()).collect(),
            scores: names.into_iter().zip(scores).collect(),
        })
    }
}

/// `(|all| - |top_i|) / |all|` where `all` is the union of every top set.
fn overlap_rates<T: NodeId>(top: &[HashSet<T>]) -> Vec<f64> {
    let all: HashSet<&T> = top.iter().flatten().collect();
    let total = all.len() as f64;
    top.iter()
        .map(|set| (total - set.len() as f64) / total)
        .collect()
}

/// `1 - sum(freq) / (sqrt(|top_i|) * sqrt(sum(freq^2)))`, with `freq` the
/// number of top sets a node appears in.
fn bias_rates<T: NodeId>(top: &[HashSet<T>]) -> Vec<f64> {
    let mut frequency: HashMap<&T, usize> = HashMap::new();
    for node in top.iter().flatten() {
        *frequency.entry(node).or_default() += 1;
    }
    let squares: usize = frequency.values().map(|f| f * f).sum();
    top.iter()
        .map(|set| {
            let hits: usize = set.iter().map(|n| frequency.get(n).copied().unwrap_or(0)).sum();
            1.0 - hits as f64 / ((set.len() as f64).sqrt() * (squares as f64).sqrt())
        })
        .collect()
}

/// Indices of the kept localizers: overlap rate ascending, bias rate
/// descending, stable, until at least half are kept.
fn select(scores: &[f64], selection: SelectionTechnique) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    match selection {
        SelectionTechnique::OverlapRate => order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b])),
        SelectionTechnique::BiasRate => order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a])),
    }
    let keep = scores.len().div_ceil(2).max(1);
    order.truncate(keep);
    order
}

fn combine(technique: FusionTechnique, contributions: &[f64]) -> f64 {
    let sum: f64 = contributions.iter().sum();
    let nonzero = contributions.iter().filter(|&&s| s != 0.0).count();
    match technique {
        FusionTechnique::CombSum => sum,
        FusionTechnique::CombAnz if nonzero == 0 => 0.0,
        FusionTechnique::CombAnz => sum / nonzero as f64,
        FusionTechnique::CombMnz => sum * nonzero as f64,
    }
}

impl<T: NodeId> FaultLocalizer<T> for FusingLocalizer<T> {
    fn name(&self) -> String {
        format!(
            "F-{}-{}-{}",
            self.normalization,
            selection_name(self.selection),
            technique_name(self.technique)
        )
    }

    fn localize(&self, spectra: &dyn Spectrum<Id = T>) -> Result<Ranking<T>, LocalizeError> {
        self.fuse(spectra).map(|outcome| outcome.ranking)
    }
}

impl<T: NodeId> std::fmt::Debug for FusingLocalizer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusingLocalizer")
            .field("name", &self.name())
            .field("pool", &self.localizer_names())
            .finish()
    }
}
