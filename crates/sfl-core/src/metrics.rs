//! Per-node evaluation metrics as semicolon-separated rows.
//!
//! Row layout: `BugID;Line;IF;IS;NF;NS;BestRanking;WorstRanking;
//! MinWastedEffort;MaxWastedEffort;Suspiciousness`. Fields are not wrapped
//! in quotes; embedded `"` characters are doubled.

use std::io::{self, Write};

use serde::Serialize;
use sfl_math::NodeCounts;
use sfl_spectra::{NodeId, Spectrum};

use crate::ranking::{RankingError, RankingMetric, RankingView};

pub const CSV_DELIMITER: &str = ";";
pub const CSV_QUOTE: &str = "\"";

pub const CSV_HEADER: [&str; 11] = [
    "BugID",
    "Line",
    "IF",
    "IS",
    "NF",
    "NS",
    "BestRanking",
    "WorstRanking",
    "MinWastedEffort",
    "MaxWastedEffort",
    "Suspiciousness",
];

/// Join `parts` into one line without a trailing newline.
pub fn csv_line<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref().replace(CSV_QUOTE, "\"\""))
        .collect::<Vec<_>>()
        .join(CSV_DELIMITER)
}

pub fn header_line() -> String {
    csv_line(&CSV_HEADER)
}

/// Metrics of one node for one bug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub bug_id: String,
    pub node: String,
    pub counts: NodeCounts,
    pub best_ranking: usize,
    pub worst_ranking: usize,
    pub min_wasted_effort: f64,
    pub max_wasted_effort: f64,
    #[serde(serialize_with = "crate::output::serialize_score")]
    pub suspiciousness: f64,
}

impl MetricsRow {
    pub fn new<T: NodeId>(
        bug_id: impl Into<String>,
        counts: NodeCounts,
        metric: &RankingMetric<T>,
    ) -> Self {
        Self {
            bug_id: bug_id.into(),
            node: metric.node.to_string(),
            counts,
            best_ranking: metric.best_ranking,
            worst_ranking: metric.worst_ranking,
            min_wasted_effort: metric.min_wasted_effort(),
            max_wasted_effort: metric.max_wasted_effort(),
            suspiciousness: metric.suspiciousness,
        }
    }

    pub fn fields(&self) -> [String; 11] {
        let c = &self.counts;
        [
            self.bug_id.clone(),
            self.node.clone(),
            c.involved_failing.to_string(),
            c.involved_successful.to_string(),
            c.not_involved_failing.to_string(),
            c.not_involved_successful.to_string(),
            self.best_ranking.to_string(),
            self.worst_ranking.to_string(),
            self.min_wasted_effort.to_string(),
            self.max_wasted_effort.to_string(),
            self.suspiciousness.to_string(),
        ]
    }

    pub fn to_csv_line(&self) -> String {
        csv_line(&self.fields())
    }
}

/// One row per node in `nodes`, in the order given.
pub fn collect_rows<T: NodeId>(
    bug_id: &str,
    spectra: &dyn Spectrum<Id = T>,
    ranking: &dyn RankingView<T>,
    nodes: &[T],
) -> Result<Vec<MetricsRow>, RankingError> {
    nodes
        .iter()
        .map(|node| {
            let metric = ranking.ranking_metrics(node)?;
            Ok(MetricsRow::new(bug_id, spectra.counts(node), &metric))
        })
        .collect()
}

/// Write the header and every row, one per line.
pub fn write_metrics<W: Write>(mut out: W, rows: &[MetricsRow]) -> io::Result<()> {
    writeln!(out, "{}", header_line())?;
    for row in rows {
        writeln!(out, "{}", row.to_csv_line())?;
    }
    Ok(())
}
