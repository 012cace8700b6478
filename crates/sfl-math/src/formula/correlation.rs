//! Contingency-table correlation statistics.
//!
//! Each formula reads the counts as a 2x2 table (involved / not involved
//! against failing / successful) and measures association between the two
//! axes. Most are signed: negative values mean the node is associated with
//! passing runs.

use crate::NodeCounts;

/// Marginal products of the 2x2 table, shared by several statistics.
struct Margins {
    involved: f64,
    not_involved: f64,
    failing: f64,
    successful: f64,
}

fn margins(c: &NodeCounts) -> Margins {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    Margins {
        involved: i_f + i_s,
        not_involved: n_s + n_f,
        failing: i_f + n_f,
        successful: i_s + n_s,
    }
}

/// `(2 IF NS - 2 NF IS) / ((IF+IS)(NS+NF) + (IF+NF)(IS+NS))`
pub fn arithmetic_mean(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let m = margins(c);
    let numerator = 2.0 * i_f * n_s - 2.0 * n_f * i_s;
    numerator / (m.involved * m.not_involved + m.failing * m.successful)
}

/// Cohen's kappa over the involvement table.
pub fn cohen(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let numerator = 2.0 * i_f * n_s - 2.0 * n_f * i_s;
    let denominator = (i_f + i_s) * (n_s + i_s) + (i_f + n_f) * (n_f + n_s);
    numerator / denominator
}

/// Fleiss' kappa over the involvement table.
pub fn fleiss(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let disagreement = n_f - i_s;
    let numerator = 4.0 * i_f * n_s - 4.0 * n_f * i_s - disagreement * disagreement;
    let denominator = (2.0 * i_f + n_f + i_s) + (2.0 * n_s + n_f + i_s);
    numerator / denominator
}

/// `(IF NS - NF IS) / sqrt((IF+IS)(NS+NF)(IF+NF)(IS+NS))`
pub fn geometric_mean(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let m = margins(c);
    (i_f * n_s - n_f * i_s) / (m.involved * m.not_involved * m.failing * m.successful).sqrt()
}

/// Harmonic mean of the two conditional association ratios.
pub fn harmonic_mean(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let m = margins(c);
    let numerator = (i_f * n_s - n_f * i_s)
        * (m.involved * m.not_involved + m.failing * m.successful);
    numerator / (m.involved * m.not_involved * m.failing * m.successful)
}

/// `IF NS / sqrt((IF+IS)(NS+NF)(IF+NF)(IS+NS))`
pub fn ochiai2(c: &NodeCounts) -> f64 {
    let (i_f, _, _, n_s) = c.as_f64();
    let m = margins(c);
    (i_f * n_s) / (m.involved * m.not_involved * m.failing * m.successful).sqrt()
}

/// Scott's pi over the involvement table.
pub fn scott(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let disagreement = n_f - i_s;
    let numerator = 4.0 * i_f * n_s - 4.0 * n_f * i_s - disagreement * disagreement;
    let denominator = (2.0 * i_f + n_f + i_s) * (2.0 * n_s + n_f + i_s);
    numerator / denominator
}
