//! Formulas designed specifically for fault localization.

use crate::NodeCounts;

/// Weight applied to the `NF * IS` penalty term in [`zoltar`].
const ZOLTAR_PENALTY: f64 = 10_000.0;

/// `|IF/(IF+NF) - IS/(IS+NS)|`
pub fn ample(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    (i_f / (i_f + n_f) - i_s / (i_s + n_s)).abs()
}

/// Tarantula: failing coverage ratio relative to the sum of both ratios.
pub fn tarantula(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, n_s) = c.as_f64();
    let failing_ratio = i_f / (i_f + n_f);
    failing_ratio / (failing_ratio + i_s / (i_s + n_s))
}

/// `IF`
pub fn wong1(c: &NodeCounts) -> f64 {
    c.involved_failing as f64
}

/// `IF - IS`
pub fn wong2(c: &NodeCounts) -> f64 {
    let (i_f, _, i_s, _) = c.as_f64();
    i_f - i_s
}

/// Piecewise weighting of successful involvement.
pub fn wong3(c: &NodeCounts) -> f64 {
    let i_s = c.involved_successful as f64;
    if c.involved_successful <= 2 {
        i_s
    } else if c.involved_successful <= 10 {
        2.0 + 0.1 * (i_s - 2.0)
    } else {
        2.8 + 0.001 * (i_s - 10.0)
    }
}

/// `IF / (IF + NF + IS + 10000 NF IS / IF)`
pub fn zoltar(c: &NodeCounts) -> f64 {
    let (i_f, n_f, i_s, _) = c.as_f64();
    let penalty = (ZOLTAR_PENALTY * n_f * i_s) / i_f;
    i_f / (i_f + n_f + i_s + penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn tarantula_reference_values() {
        // S1, S2, S3 of the five-trace reference spectra
        assert!(approx_eq(tarantula(&NodeCounts::new(1, 1, 3, 0)), 1.0 / 3.0, 1e-12));
        assert!(approx_eq(tarantula(&NodeCounts::new(2, 0, 1, 2)), 0.75, 1e-12));
        assert!(approx_eq(tarantula(&NodeCounts::new(1, 1, 2, 1)), 3.0 / 7.0, 1e-12));
    }

    #[test]
    fn tarantula_without_failing_runs_is_nan() {
        assert!(tarantula(&NodeCounts::new(0, 0, 2, 1)).is_nan());
    }

    #[test]
    fn wong3_piecewise_boundaries() {
        assert_eq!(wong3(&NodeCounts::new(0, 0, 2, 0)), 2.0);
        assert!(approx_eq(wong3(&NodeCounts::new(0, 0, 10, 0)), 2.8, 1e-12));
        assert!(approx_eq(wong3(&NodeCounts::new(0, 0, 11, 0)), 2.801, 1e-12));
        assert!(approx_eq(wong3(&NodeCounts::new(0, 0, 3, 0)), 2.1, 1e-12));
    }

    #[test]
    fn zoltar_penalizes_missed_failures() {
        let clean = zoltar(&NodeCounts::new(2, 0, 1, 0));
        let missed = zoltar(&NodeCounts::new(2, 1, 1, 0));
        assert!(approx_eq(clean, 2.0 / 3.0, 1e-12));
        assert!(missed < 0.001);
    }

    #[test]
    fn zoltar_unexecuted_in_failures() {
        // IF = 0 with a non-zero penalty: 0 / inf
        assert_eq!(zoltar(&NodeCounts::new(0, 2, 1, 0)), 0.0);
        // IF = 0 without penalty: 0 / 0
        assert!(zoltar(&NodeCounts::new(0, 2, 0, 1)).is_nan());
    }

    #[test]
    fn wong_counts() {
        let c = NodeCounts::new(3, 0, 5, 1);
        assert_eq!(wong1(&c), 3.0);
        assert_eq!(wong2(&c), -2.0);
    }

    #[test]
    fn ample_is_absolute() {
        let c = NodeCounts::new(0, 2, 2, 0);
        assert_eq!(ample(&c), 1.0);
    }
}
