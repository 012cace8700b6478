//! Rankings: nodes in a total order of descending suspiciousness.
//!
//! Ties keep the order in which nodes were first ranked. Positional metrics
//! (best and worst rank among equal scores) are built lazily in one forward
//! and one backward pass and dropped on every insertion.

mod normalized;

pub use normalized::{NormalizationStrategy, NormalizedRanking};

use indexmap::IndexMap;
use serde::Serialize;
use sfl_spectra::NodeId;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when reading a ranking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    #[error("node {0} is not part of the ranking")]
    NodeNotRanked(String),

    #[error("malformed ranking dump at line {line}: {content:?}")]
    MalformedDump { line: usize, content: String },
}

/// Positional metrics of one ranked node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingMetric<T> {
    pub node: T,
    /// 1-based position of the first node sharing this score.
    pub best_ranking: usize,
    /// 1-based position of the last node sharing this score.
    pub worst_ranking: usize,
    pub suspiciousness: f64,
    /// Number of ranked nodes.
    pub total: usize,
}

impl<T> RankingMetric<T> {
    pub fn min_wasted_effort(&self) -> f64 {
        (self.best_ranking - 1) as f64 / self.total as f64
    }

    pub fn max_wasted_effort(&self) -> f64 {
        (self.worst_ranking - 1) as f64 / self.total as f64
    }
}

/// Read access shared by [`Ranking`] and [`NormalizedRanking`].
pub trait RankingView<T: NodeId> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, node: &T) -> bool;

    fn suspiciousness(&self, node: &T) -> Result<f64, RankingError>;

    /// Zero-based position of `node` in the total order.
    fn wasted_effort(&self, node: &T) -> Result<usize, RankingError>;

    fn ranking_metrics(&self, node: &T) -> Result<RankingMetric<T>, RankingError>;

    /// Nodes and scores, most suspicious first.
    fn ordered(&self) -> Vec<(T, f64)>;
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    suspiciousness: f64,
    seq: u64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    suspiciousness: f64,
    seq: u64,
    node: T,
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .suspiciousness
            .total_cmp(&self.suspiciousness)
            .then(self.seq.cmp(&other.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

#[derive(Debug, Clone, Copy)]
struct Position {
    index: usize,
    best: usize,
    worst: usize,
}

/// NaN sorts last, and `-0.0` must not tie-break differently from `0.0`.
fn sanitize(suspiciousness: f64) -> f64 {
    if suspiciousness.is_nan() {
        f64::NEG_INFINITY
    } else if suspiciousness == 0.0 {
        0.0
    } else {
        suspiciousness
    }
}

/// A ranking of nodes by suspiciousness.
#[derive(Debug, Clone)]
pub struct Ranking<T: NodeId> {
    slots: IndexMap<T, Slot>,
    order: BTreeSet<Entry<T>>,
    next_seq: u64,
    positions: OnceCell<HashMap<T, Position>>,
}

impl<T: NodeId> Default for Ranking<T> {
    fn default() -> Self {
        Self {
            slots: IndexMap::new(),
            order: BTreeSet::new(),
            next_seq: 0,
            positions: OnceCell::new(),
        }
    }
}

impl<T: NodeId> Ranking<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank `node`, replacing any earlier score. A re-ranked node keeps its
    /// original tie-break position.
    pub fn rank(&mut self, node: T, suspiciousness: f64) {
        let suspiciousness = sanitize(suspiciousness);
        let seq = match self.slots.get(&node).copied() {
            Some(previous) => {
                self.order.remove(&Entry {
                    suspiciousness: previous.suspiciousness,
                    seq: previous.seq,
                    node: node.clone(),
                });
                previous.seq
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.slots.insert(node.clone(), Slot { suspiciousness, seq });
        self.order.insert(Entry {
            suspiciousness,
            seq,
            node,
        });
        self.positions.take();
    }

    /// A new ranking holding both; `other` wins where both rank a node.
    pub fn merge(&self, other: &Ranking<T>) -> Ranking<T> {
        let mut merged = self.clone();
        for (node, slot) in &other.slots {
            merged.rank(node.clone(), slot.suspiciousness);
        }
        merged
    }

    /// Nodes and scores, most suspicious first.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.order.iter().map(|e| (&e.node, e.suspiciousness))
    }

    /// Ranked nodes, most suspicious first.
    pub fn nodes(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().map(|e| &e.node)
    }

    /// Write one `"<node>: <score>"` line per node, most suspicious first.
    pub fn write_dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (node, suspiciousness) in self.iter() {
            writeln!(out, "{}: {}", node, suspiciousness)?;
        }
        Ok(())
    }

    pub fn to_dump_string(&self) -> String {
        let mut out = String::new();
        for (node, suspiciousness) in self.iter() {
            out.push_str(&format!("{}: {}\n", node, suspiciousness));
        }
        out
    }

    /// Save the text dump to `path`.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut out = io::BufWriter::new(file);
        self.write_dump(&mut out)?;
        out.flush()
    }

    fn positions(&self) -> &HashMap<T, Position> {
        self.positions.get_or_init(|| self.compute_positions())
    }

    fn compute_positions(&self) -> HashMap<T, Position> {
        let entries: Vec<&Entry<T>> = self.order.iter().collect();
        let mut positions = HashMap::with_capacity(entries.len());

        let mut best = 0;
        let mut previous: Option<f64> = None;
        for (index, entry) in entries.iter().enumerate() {
            if previous != Some(entry.suspiciousness) {
                best = index + 1;
                previous = Some(entry.suspiciousness);
            }
            positions.insert(
                entry.node.clone(),
                Position {
                    index,
                    best,
                    worst: 0,
                },
            );
        }

        let mut worst = entries.len();
        previous = None;
        for (index, entry) in entries.iter().enumerate().rev() {
            if previous != Some(entry.suspiciousness) {
                worst = index + 1;
                previous = Some(entry.suspiciousness);
            }
            if let Some(position) = positions.get_mut(&entry.node) {
                position.worst = worst;
            }
        }

        positions
    }

    fn position(&self, node: &T) -> Result<Position, RankingError> {
        self.positions()
            .get(node)
            .copied()
            .ok_or_else(|| RankingError::NodeNotRanked(node.to_string()))
    }
}

impl<T: NodeId + FromStr> Ranking<T> {
    /// Parse a text dump written by [`Ranking::write_dump`].
    ///
    /// Blank lines are ignored. Nodes are ranked in file order, so ties come
    /// back in the order they were written.
    pub fn parse_dump(text: &str) -> Result<Ranking<T>, RankingError> {
        let mut ranking = Ranking::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || RankingError::MalformedDump {
                line: index + 1,
                content: line.to_string(),
            };
            let (node, value) = line.rsplit_once(": ").ok_or_else(malformed)?;
            let node = node.parse::<T>().map_err(|_| malformed())?;
            let value = value.trim().parse::<f64>().map_err(|_| malformed())?;
            ranking.rank(node, value);
        }
        Ok(ranking)
    }
}

impl<T: NodeId> RankingView<T> for Ranking<T> {
    fn len(&self) -> usize {
        self.slots.len()
    }

    fn contains(&self, node: &T) -> bool {
        self.slots.contains_key(node)
    }

    fn suspiciousness(&self, node: &T) -> Result<f64, RankingError> {
        self.slots
            .get(node)
            .map(|slot| slot.suspiciousness)
            .ok_or_else(|| RankingError::NodeNotRanked(node.to_string()))
    }

    fn wasted_effort(&self, node: &T) -> Result<usize, RankingError> {
        Ok(self.position(node)?.index)
    }

    fn ranking_metrics(&self, node: &T) -> Result<RankingMetric<T>, RankingError> {
        let position = self.position(node)?;
        Ok(RankingMetric {
            node: node.clone(),
            best_ranking: position.best,
            worst_ranking: position.worst,
            suspiciousness: self.suspiciousness(node)?,
            total: self.len(),
        })
    }

    fn ordered(&self) -> Vec<(T, f64)> {
        self.iter().map(|(n, s)| (n.clone(), s)).collect()
    }
}
