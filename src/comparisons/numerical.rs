//! NUMERICAL COMPARISON
//!
//! Compares the mean of one numeric trait between two taxa groups with
//! Welch's t-test (no equal-variance assumption, unequal sizes allowed).
//!
//! Missing values are NaN. Means skip them; the t-test follows the configured
//! `NanPolicy`. An empty group has a NaN mean instead of failing, so the
//! report keeps going through the other traits.

use crate::config::ComparisonConfig;
use crate::utils::{nan_mean, welch_ttest};

/// Result of one numerical comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericalResult {
    /// Mean of group A
    pub abundance_in: f64,
    /// Mean of group B
    pub abundance_out: f64,
    pub pvalue: f64,
}

pub fn compare_numeric(
    group_a: &[f64],
    group_b: &[f64],
    config: &ComparisonConfig,
) -> NumericalResult {
    let test = welch_ttest(group_a, group_b, config.nan_policy);

    NumericalResult {
        abundance_in: nan_mean(group_a),
        abundance_out: nan_mean(group_b),
        pvalue: test.pvalue,
    }
}
