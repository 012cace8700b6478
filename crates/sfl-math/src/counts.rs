//! Involvement counts of a single node.

use serde::{Deserialize, Serialize};

/// Pass/fail involvement counts of one node over all traces of a spectra.
///
/// The four counts always add up to the number of traces the node was
/// counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeCounts {
    /// IF: failing traces the node is involved in.
    #[serde(rename = "if")]
    pub involved_failing: usize,
    /// NF: failing traces the node is not involved in.
    #[serde(rename = "nf")]
    pub not_involved_failing: usize,
    /// IS: successful traces the node is involved in.
    #[serde(rename = "is")]
    pub involved_successful: usize,
    /// NS: successful traces the node is not involved in.
    #[serde(rename = "ns")]
    pub not_involved_successful: usize,
}

impl NodeCounts {
    /// Build counts in the conventional `(IF, NF, IS, NS)` argument order.
    pub const fn new(
        involved_failing: usize,
        not_involved_failing: usize,
        involved_successful: usize,
        not_involved_successful: usize,
    ) -> Self {
        Self {
            involved_failing,
            not_involved_failing,
            involved_successful,
            not_involved_successful,
        }
    }

    /// Total number of traces these counts were taken over.
    pub fn total(&self) -> usize {
        self.involved_failing
            + self.not_involved_failing
            + self.involved_successful
            + self.not_involved_successful
    }

    /// Number of failing traces.
    pub fn failing(&self) -> usize {
        self.involved_failing + self.not_involved_failing
    }

    /// Number of successful traces.
    pub fn successful(&self) -> usize {
        self.involved_successful + self.not_involved_successful
    }

    /// `(IF, NF, IS, NS)` as floats, the shape every formula works on.
    pub fn as_f64(&self) -> (f64, f64, f64, f64) {
        (
            self.involved_failing as f64,
            self.not_involved_failing as f64,
            self.involved_successful as f64,
            self.not_involved_successful as f64,
        )
    }

    /// Record one trace outcome for the node.
    pub fn record(&mut self, successful: bool, involved: bool) {
        match (successful, involved) {
            (false, true) => self.involved_failing += 1,
            (false, false) => self.not_involved_failing += 1,
            (true, true) => self.involved_successful += 1,
            (true, false) => self.not_involved_successful += 1,
        }
    }
}

impl std::fmt::Display for NodeCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IF={} NF={} IS={} NS={}",
            self.involved_failing,
            self.not_involved_failing,
            self.involved_successful,
            self.not_involved_successful
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sorts_into_quadrants() {
        let mut c = NodeCounts::default();
        c.record(false, true);
        c.record(false, false);
        c.record(true, true);
        c.record(true, true);
        c.record(true, false);
        assert_eq!(c, NodeCounts::new(1, 1, 2, 1));
        assert_eq!(c.total(), 5);
        assert_eq!(c.failing(), 2);
        assert_eq!(c.successful(), 3);
    }

    #[test]
    fn display_lists_all_counts() {
        let c = NodeCounts::new(1, 2, 3, 4);
        assert_eq!(c.to_string(), "IF=1 NF=2 IS=3 NS=4");
    }

    #[test]
    fn as_f64_keeps_argument_order() {
        let (ef, nf, es, ns) = NodeCounts::new(1, 2, 3, 4).as_f64();
        assert_eq!((ef, nf, es, ns), (1.0, 2.0, 3.0, 4.0));
    }
}
