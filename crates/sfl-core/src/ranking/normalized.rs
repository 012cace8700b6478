//! Rankings with scores rescaled for comparison across formulas.

use super::{Ranking, RankingError, RankingMetric, RankingView};
use serde::{Deserialize, Serialize};
use sfl_spectra::NodeId;
use std::cell::OnceCell;

/// How raw suspiciousness is rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStrategy {
    /// Linear rescale of finite scores into `[0, 1]`; `+inf` maps to 1 and
    /// `-inf` to 0.
    ZeroOne,
    /// `1 / worst_ranking`.
    ReciprocalRank,
}

impl NormalizationStrategy {
    pub fn name(self) -> &'static str {
        match self {
            NormalizationStrategy::ZeroOne => "ZeroOne",
            NormalizationStrategy::ReciprocalRank => "ReciprocalRank",
        }
    }
}

impl std::fmt::Display for NormalizationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl From<sfl_config::NormalizationKind> for NormalizationStrategy {
    fn from(kind: sfl_config::NormalizationKind) -> Self {
        match kind {
            sfl_config::NormalizationKind::ZeroOne => NormalizationStrategy::ZeroOne,
            sfl_config::NormalizationKind::ReciprocalRank => NormalizationStrategy::ReciprocalRank,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Extrema {
    min: f64,
    max: f64,
}

/// A [`Ranking`] read through a normalization strategy.
///
/// The order is that of the underlying ranking; only reported scores change.
#[derive(Debug, Clone)]
pub struct NormalizedRanking<T: NodeId> {
    inner: Ranking<T>,
    strategy: NormalizationStrategy,
    extrema: OnceCell<Extrema>,
}

impl<T: NodeId> NormalizedRanking<T> {
    pub fn new(strategy: NormalizationStrategy) -> Self {
        Self::from_ranking(Ranking::new(), strategy)
    }

    pub fn from_ranking(ranking: Ranking<T>, strategy: NormalizationStrategy) -> Self {
        Self {
            inner: ranking,
            strategy,
            extrema: OnceCell::new(),
        }
    }

    pub fn strategy(&self) -> NormalizationStrategy {
        self.strategy
    }

    /// The raw ranking.
    pub fn raw(&self) -> &Ranking<T> {
        &self.inner
    }

    pub fn rank(&mut self, node: T, suspiciousness: f64) {
        self.inner.rank(node, suspiciousness);
        self.extrema.take();
    }

    /// Merge raw scores; `other` wins on collision. Keeps this strategy.
    pub fn merge(&self, other: &NormalizedRanking<T>) -> NormalizedRanking<T> {
        NormalizedRanking::from_ranking(self.inner.merge(&other.inner), self.strategy)
    }

    /// A plain ranking holding the normalized scores, in the current order.
    pub fn to_ranking(&self) -> Ranking<T> {
        let mut ranking = Ranking::new();
        for (node, score) in self.ordered() {
            ranking.rank(node, score);
        }
        ranking
    }

    fn extrema(&self) -> Extrema {
        *self.extrema.get_or_init(|| {
            let mut finite = self.inner.iter().map(|(_, s)| s).filter(|s| s.is_finite());
            match finite.next() {
                Some(first) => finite.fold(Extrema { min: first, max: first }, |e, s| Extrema {
                    min: e.min.min(s),
                    max: e.max.max(s),
                }),
                None => Extrema { min: 1.0, max: 1.0 },
            }
        })
    }

    fn normalize(&self, node: &T, raw: f64) -> Result<f64, RankingError> {
        match self.strategy {
            NormalizationStrategy::ZeroOne => {
                if raw.is_nan() || raw == f64::NEG_INFINITY {
                    return Ok(0.0);
                }
                if raw == f64::INFINITY {
                    return Ok(1.0);
                }
                let Extrema { min, max } = self.extrema();
                if max == min {
                    return Ok(0.5);
                }
                Ok((raw - min) / (max - min))
            }
            NormalizationStrategy::ReciprocalRank => {
                let worst = self.inner.ranking_metrics(node)?.worst_ranking;
                Ok(1.0 / worst as f64)
            }
        }
    }
}

impl<T: NodeId> RankingView<T> for NormalizedRanking<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains(&self, node: &T) -> bool {
        self.inner.contains(node)
    }

    fn suspiciousness(&self, node: &T) -> Result<f64, RankingError> {
        let raw = self.inner.suspiciousness(node)?;
        self.normalize(node, raw)
    }

    fn wasted_effort(&self, node: &T) -> Result<usize, RankingError> {
        self.inner.wasted_effort(node)
    }

    fn ranking_metrics(&self, node: &T) -> Result<RankingMetric<T>, RankingError> {
        let mut metric = self.inner.ranking_metrics(node)?;
        metric.suspiciousness = self.normalize(node, metric.suspiciousness)?;
        Ok(metric)
    }

    fn ordered(&self) -> Vec<(T, f64)> {
        self.inner
            .iter()
            .map(|(node, raw)| {
                let score = self.normalize(node, raw).unwrap_or(0.0);
                (node.clone(), score)
            })
            .collect()
    }
}
