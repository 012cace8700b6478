//! Set-similarity coefficients.
//!
//! These treat a node's failing-trace coverage and the set of failing traces
//! as two sets and score how much they overlap. Degenerate denominators are
//! left to IEEE arithmetic: `0/0` is NaN and `x/0` is infinite.

use crate::NodeCounts;

/// `IF / (IF + 2(NF + IS))`
pub fn anderberg(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    i_f / (i_f + 2.0 * (n_f + i_s))
}

/// `2IF / (2IF + NF + IS)`
///
/// Shares the Sørensen–Dice definition; both names are kept because
/// published evaluations list them separately.
pub fn dice(c: &NodeCounts) -> f64 {
    sorensen_dice(c)
}

/// `sqrt(IF + NS)`
pub fn euclid(c: &NodeCounts) -> f64 {
    let (i_f, _, _, n_s) = c.as_f64();
    (i_f + n_s).sqrt()
}

/// `(2IF - NF - IS) / (2IF + NF + IS)`
pub fn goodman(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    (2.0 * i_f - n_f - i_s) / (2.0 * i_f + n_f + i_s)
}

/// `(IF + NS - NF - IS) / (IF + NF + IS + NS)`
pub fn hamann(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    (i_f + n_s - n_f - i_s) / (i_f + n_f + i_s + n_s)
}

/// `IF + NS`
pub fn hamming(c: &NodeCounts) -> f64 {
    let (i_f, _, _, n_s) = c.as_f64();
    i_f + n_s
}

/// `IF / (IF + NF + IS)`
pub fn jaccard(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    i_f / (i_f + n_f + i_s)
}

/// `IF / (NF + IS)`
pub fn kulczynski1(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    i_f / (n_f + i_s)
}

/// `0.5 (IF / (IF + NF) + IF / (IF + IS))`
pub fn kulczynski2(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    0.5 * (i_f / (i_f + n_f) + i_f / (i_f + i_s))
}

/// `(IF + NS) / (NF + IS)`
pub fn m1(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    (i_f + n_s) / (n_f + i_s)
}

/// `IF / (IF + NS + 2(NF + IS))`
pub fn m2(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    i_f / (i_f + n_s + 2.0 * (n_f + i_s))
}

/// `IF / sqrt((IF + NF)(IF + IS))`
pub fn ochiai(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    i_f / ((i_f + n_f) * (i_f + i_s)).sqrt()
}

/// `IF / min(IF, NF, IS)`
pub fn overlap(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    i_f / i_f.min(n_f).min(i_s)
}

/// `(IF + NS) / (IF + NS + 2(NF + IS))`
pub fn rogers_tanimoto(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    (i_f + n_s) / (i_f + n_s + 2.0 * (n_f + i_s))
}

/// `0.5 (IF / (2IF + NF + IS) + NS / (2NS + NF + IS))`
pub fn rogot1(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    0.5 * (i_f / (2.0 * i_f + n_f + i_s) + n_s / (2.0 * n_s + n_f + i_s))
}

/// Mean of the four conditional agreement ratios.
pub fn rogot2(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    0.25 * (i_f / (i_f + i_s) + i_f / (i_f + n_f) + n_s / (n_s + i_s) + n_s / (n_s + n_f))
}

/// `IF / (IF + NF + IS + NS)`
pub fn russell_rao(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    i_f / (i_f + n_f + i_s + n_s)
}

/// `(IF + NS) / (IF + NF + IS + NS)`
pub fn simple_matching(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    (i_f + n_s) / (i_f + n_f + i_s + n_s)
}

/// `2(IF + NS) / (2(IF + NS) + NF + IS)`
pub fn sokal(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let agree = 2.0 * (i_f + n_s);
    agree / (agree + n_f + i_s)
}

/// `2IF / (2IF + NF + IS)`
pub fn sorensen_dice(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    (2.0 * i_f) / (2.0 * i_f + n_f + i_s)
}
